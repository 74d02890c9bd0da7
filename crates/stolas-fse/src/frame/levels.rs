//! Numeric compression-level presets.
//!
//! Levels are a thin table over the frame knobs: block size, table size,
//! bit ordering, and writer width. The coded semantics are identical at
//! every level; the tiers trade setup cost against throughput and ratio.

use stolas_core::{BitOrdering, CompressionLevel};

use super::FrameOptions;

/// Map a numeric level onto frame options.
///
/// Tiers, lowest to highest:
/// 1. single-block MSB baseline (reference path)
/// 2. single-block LSB
/// 3. single-block LSB with the wide writer
/// 4. framed 32 KiB blocks, LSB wide
/// 5. single-block LSB wide
/// 6. framed 32 KiB blocks, smaller table
/// 7-8. framed 64 KiB blocks
/// 9+. framed 64 KiB blocks, full-size table
pub fn options_for_level(level: i32) -> FrameOptions {
    if level <= 1 {
        return FrameOptions {
            block_size: 0,
            table_log: 12,
            ordering: BitOrdering::Msb,
            wide_writer: false,
        };
    }
    if level == 2 {
        return FrameOptions {
            block_size: 0,
            table_log: 12,
            ordering: BitOrdering::Lsb,
            wide_writer: false,
        };
    }
    if level == 3 {
        return FrameOptions {
            block_size: 0,
            table_log: 12,
            ordering: BitOrdering::Lsb,
            wide_writer: true,
        };
    }
    if level == 4 {
        return FrameOptions {
            block_size: 32 * 1024,
            table_log: 12,
            ordering: BitOrdering::Lsb,
            wide_writer: true,
        };
    }
    if level == 5 {
        return FrameOptions {
            block_size: 0,
            table_log: 12,
            ordering: BitOrdering::Lsb,
            wide_writer: true,
        };
    }
    if level <= 8 {
        let table_log = if level <= 6 { 11 } else { 12 };
        let block_size = if level <= 6 { 32 * 1024 } else { 64 * 1024 };
        return FrameOptions {
            block_size,
            table_log,
            ordering: BitOrdering::Lsb,
            wide_writer: false,
        };
    }
    FrameOptions {
        block_size: 64 * 1024,
        table_log: 12,
        ordering: BitOrdering::Lsb,
        wide_writer: false,
    }
}

impl FrameOptions {
    /// Frame options for a numeric preset level.
    pub fn from_level(level: i32) -> Self {
        options_for_level(level)
    }
}

impl From<CompressionLevel> for FrameOptions {
    fn from(level: CompressionLevel) -> Self {
        options_for_level(level.to_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_stay_within_codec_limits() {
        for level in -1..=12 {
            let opts = options_for_level(level);
            assert!((1..=15).contains(&opts.table_log), "level {}", level);
        }
    }

    #[test]
    fn test_baseline_level_is_msb_single_block() {
        let opts = options_for_level(1);
        assert_eq!(opts.ordering, BitOrdering::Msb);
        assert_eq!(opts.block_size, 0);
        assert!(!opts.wide_writer);
    }

    #[test]
    fn test_higher_levels_use_framed_lsb() {
        for level in [4, 6, 7, 9] {
            let opts = options_for_level(level);
            assert_eq!(opts.ordering, BitOrdering::Lsb, "level {}", level);
            assert!(opts.block_size > 0, "level {}", level);
        }
    }

    #[test]
    fn test_preset_enum_maps_through_numeric_levels() {
        let opts = FrameOptions::from(CompressionLevel::Default);
        assert_eq!(opts, options_for_level(CompressionLevel::Default.to_level()));
        let opts = FrameOptions::from(CompressionLevel::Custom(2));
        assert_eq!(opts.ordering, BitOrdering::Lsb);
        assert_eq!(opts.block_size, 0);
    }
}
