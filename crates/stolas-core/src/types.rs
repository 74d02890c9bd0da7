//! Core type definitions for entropy coding operations.

use crate::error::{Error, Result};

/// Compression level presets.
///
/// Levels are a pure mapping onto codec knobs (block size, table size,
/// bit ordering); the coded semantics are identical across levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompressionLevel {
    /// Baseline single-block configuration (slowest, reference path).
    None,

    /// Optimized for speed over ratio.
    Fast,

    /// Balanced speed and ratio (default).
    #[default]
    Default,

    /// Optimized for ratio over speed.
    Best,

    /// Maximum effort configuration.
    Ultra,

    /// Custom numeric level (algorithm-specific range).
    Custom(i32),
}

impl CompressionLevel {
    /// Convert to numeric level for algorithms.
    pub fn to_level(self) -> i32 {
        match self {
            CompressionLevel::None => 1,
            CompressionLevel::Fast => 3,
            CompressionLevel::Default => 4,
            CompressionLevel::Best => 7,
            CompressionLevel::Ultra => 9,
            CompressionLevel::Custom(level) => level,
        }
    }

    /// Create from numeric level.
    pub fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=1 => CompressionLevel::None,
            2..=3 => CompressionLevel::Fast,
            4..=5 => CompressionLevel::Default,
            6..=8 => CompressionLevel::Best,
            9.. => CompressionLevel::Ultra,
        }
    }
}

/// Supported entropy coding algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Finite State Entropy (tabled ANS) order-0 coder.
    Fse,
}

impl Algorithm {
    /// Get algorithm name as string.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Fse => "fse",
        }
    }
}

/// Bit-numbering convention within each payload byte.
///
/// Encoder and decoder for a given stream must agree on the ordering;
/// a stream written in one ordering is not parseable in the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BitOrdering {
    /// Bit `i` maps to byte `i / 8`, bit `7 - (i % 8)`. Canonical reference
    /// ordering; processed bit-at-a-time.
    #[default]
    Msb,
    /// Bit `i` maps to byte `i / 8`, bit `i % 8`. Processed at word speed
    /// through a 64-bit register.
    Lsb,
}

impl BitOrdering {
    /// Get ordering name as string.
    pub fn name(self) -> &'static str {
        match self {
            BitOrdering::Msb => "msb",
            BitOrdering::Lsb => "lsb",
        }
    }

    /// Parse an ordering name as used in configuration surfaces.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "msb" => Ok(BitOrdering::Msb),
            "lsb" => Ok(BitOrdering::Lsb),
            other => Err(Error::UnsupportedOrdering(other.to_string())),
        }
    }
}

/// Compression ratio metrics.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompressionRatio {
    /// Original uncompressed size in bytes.
    pub original_size: usize,
    /// Compressed size in bytes.
    pub compressed_size: usize,
}

impl CompressionRatio {
    /// Create new ratio from sizes.
    pub fn new(original: usize, compressed: usize) -> Self {
        CompressionRatio {
            original_size: original,
            compressed_size: compressed,
        }
    }

    /// Calculate ratio (original / compressed).
    /// Higher is better (more compression).
    pub fn ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.compressed_size as f64
    }

    /// Calculate space savings as percentage (0-100).
    pub fn savings_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - (self.compressed_size as f64 / self.original_size as f64)) * 100.0
    }

    /// Calculate bytes saved.
    pub fn bytes_saved(&self) -> isize {
        self.original_size as isize - self.compressed_size as isize
    }

    /// Check if compression was effective (saved space).
    pub fn is_effective(&self) -> bool {
        self.compressed_size < self.original_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_numeric_roundtrip() {
        assert_eq!(CompressionLevel::Default.to_level(), 4);
        assert_eq!(CompressionLevel::from_level(4), CompressionLevel::Default);
        assert_eq!(CompressionLevel::from_level(0), CompressionLevel::None);
        assert_eq!(CompressionLevel::from_level(100), CompressionLevel::Ultra);
        assert_eq!(CompressionLevel::Custom(6).to_level(), 6);
    }

    #[test]
    fn test_ordering_names() {
        assert_eq!(BitOrdering::Msb.name(), "msb");
        assert_eq!(BitOrdering::from_name("lsb").unwrap(), BitOrdering::Lsb);
        assert!(BitOrdering::from_name("pdp").is_err());
    }

    #[test]
    fn test_ratio_math() {
        let ratio = CompressionRatio::new(1000, 250);
        assert!((ratio.ratio() - 4.0).abs() < f64::EPSILON);
        assert!((ratio.savings_percent() - 75.0).abs() < f64::EPSILON);
        assert_eq!(ratio.bytes_saved(), 750);
        assert!(ratio.is_effective());

        let expanded = CompressionRatio::new(10, 20);
        assert!(!expanded.is_effective());
    }
}
