//! # Stolas FSE
//!
//! Finite State Entropy (tANS) block codec with self-describing frames.
//!
//! FSE is a tabled variant of Asymmetric Numeral Systems: a pure order-0
//! entropy coder over the byte alphabet. It compresses to within a few
//! percent of the order-0 entropy bound while decoding with one table
//! lookup and one bit read per symbol.
//!
//! ## Quick Start
//!
//! ```rust
//! use stolas_core::{Codec, Compressor, Decompressor};
//! use stolas_fse::FseCodec;
//!
//! let codec = FseCodec::new();
//! let compressed = codec.compress(b"Hello, World! Hello, World!").unwrap();
//! let original = codec.decompress(&compressed).unwrap();
//! assert_eq!(original, b"Hello, World! Hello, World!");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        stolas-fse                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  frame/             │  fse/                                 │
//! │  ├── header.rs      │  ├── params.rs   (normalization)      │
//! │  ├── levels.rs      │  ├── table.rs    (spread + tables)    │
//! │  └── mod.rs         │  ├── encoder.rs  (state machine)      │
//! │                     │  └── decoder.rs  (state machine)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  bitstream/                                                 │
//! │  ├── msb.rs  (reference ordering, bit-at-a-time)            │
//! │  └── lsb.rs  (word-speed writers and reader)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every block in a frame is independent and self-describing: its header
//! carries the histogram its coding tables are rebuilt from. Coding tables
//! are immutable after construction and may back any number of concurrent
//! encoders and decoders; the per-call state machines are synchronous and
//! allocate only transient buffers.
//!
//! ## Choosing options
//!
//! [`FrameOptions`] exposes the knobs directly: block size (0 = single
//! block), `table_log` (state budget, up to 15), bit ordering, and writer
//! width. Numeric presets map onto those knobs through
//! [`FrameOptions::from_level`]; the coded semantics are identical at every
//! level.

pub mod bitstream;
pub mod frame;
pub mod fse;

pub use bitstream::{
    BitRead, BitWrite, EncodedBlock, LsbReader, LsbWideWriter, LsbWriter, MsbReader, MsbWriter,
};
pub use frame::{
    decode_stream, encode_stream, options_for_level, BlockHeader, FrameOptions, BLOCK_HEADER_SIZE,
};
pub use fse::{
    BlockDecoder, BlockEncoder, DecodeEntry, DecodeResult, FseParams, FseTables, SymbolTransform,
    ALPHABET_SIZE, DATA_BLOCK_SIZE_BITS, FSE_MAX_TABLE_LOG, FSE_MIN_TABLE_LOG,
};

use std::time::Instant;

use stolas_core::{
    Algorithm, Codec, CompressionLevel, CompressionStats, Compressor, Decompressor, Error, Result,
};

// =============================================================================
// Codec Implementation
// =============================================================================

/// FSE compressor.
///
/// # Example
///
/// ```rust
/// use stolas_core::{Compressor, CompressionLevel};
/// use stolas_fse::FseCompressor;
///
/// let compressor = FseCompressor::with_level(CompressionLevel::Fast);
/// let compressed = compressor.compress(b"test data test data").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FseCompressor {
    level: CompressionLevel,
    options: FrameOptions,
}

impl FseCompressor {
    /// Create a compressor with default settings.
    pub fn new() -> Self {
        Self {
            level: CompressionLevel::Default,
            options: CompressionLevel::Default.into(),
        }
    }

    /// Create a compressor with a preset level.
    pub fn with_level(level: CompressionLevel) -> Self {
        Self {
            level,
            options: level.into(),
        }
    }

    /// Create a compressor with explicit frame options.
    pub fn with_options(options: FrameOptions) -> Self {
        Self {
            level: CompressionLevel::Custom(0),
            options,
        }
    }

    /// The frame options in effect.
    pub fn options(&self) -> &FrameOptions {
        &self.options
    }

    /// Compress and report per-operation statistics.
    pub fn compress_with_stats(&self, input: &[u8]) -> Result<(Vec<u8>, CompressionStats)> {
        let started = Instant::now();
        let compressed = encode_stream(input, &self.options)?;
        let time_us = started.elapsed().as_micros() as u64;

        let mut stats = CompressionStats::from_operation(
            Algorithm::Fse,
            input.len(),
            compressed.len(),
            time_us,
        );
        stats.blocks_processed = 0;
        let mut pos = 0usize;
        while pos < compressed.len() {
            let (header, consumed) = BlockHeader::parse(&compressed[pos..])?;
            stats.blocks_processed += 1;
            stats.payload_bits += u64::from(header.bit_count);
            pos += consumed + header.payload_bytes();
        }
        Ok((compressed, stats))
    }
}

impl Default for FseCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compressor for FseCompressor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fse
    }

    fn level(&self) -> CompressionLevel {
        self.level
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        encode_stream(input, &self.options)
    }

    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let compressed = self.compress(input)?;
        if compressed.len() > output.len() {
            return Err(Error::buffer_too_small(compressed.len(), output.len()));
        }
        output[..compressed.len()].copy_from_slice(&compressed);
        Ok(compressed.len())
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        // Worst case per symbol is table_log bits; headers dominate for
        // small blocks.
        let block_size = if self.options.block_size == 0 {
            input_len.max(1)
        } else {
            self.options.block_size
        };
        let blocks = input_len.div_ceil(block_size).max(1);
        blocks * (BLOCK_HEADER_SIZE + 8) + input_len * 2 + 8
    }
}

/// FSE decompressor.
///
/// Only the bit ordering matters on the decode side; each block header
/// carries its own table size.
#[derive(Debug, Clone, Default)]
pub struct FseDecompressor {
    options: FrameOptions,
}

impl FseDecompressor {
    /// Create a decompressor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decompressor with explicit frame options.
    pub fn with_options(options: FrameOptions) -> Self {
        Self { options }
    }
}

impl Decompressor for FseDecompressor {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fse
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        decode_stream(input, &self.options)
    }

    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let result = self.decompress(input)?;
        if result.len() > output.len() {
            return Err(Error::buffer_too_small(result.len(), output.len()));
        }
        output[..result.len()].copy_from_slice(&result);
        Ok(result.len())
    }
}

/// FSE codec combining compression and decompression.
#[derive(Debug, Clone)]
pub struct FseCodec {
    compressor: FseCompressor,
    decompressor: FseDecompressor,
}

impl FseCodec {
    /// Create a codec with explicit frame options.
    pub fn with_options(options: FrameOptions) -> Self {
        Self {
            compressor: FseCompressor::with_options(options),
            decompressor: FseDecompressor::with_options(options),
        }
    }
}

impl Default for FseCodec {
    fn default() -> Self {
        <Self as Codec>::new()
    }
}

impl Compressor for FseCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fse
    }

    fn level(&self) -> CompressionLevel {
        self.compressor.level()
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.compressor.compress(input)
    }

    fn compress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.compressor.compress_to(input, output)
    }

    fn max_compressed_size(&self, input_len: usize) -> usize {
        self.compressor.max_compressed_size(input_len)
    }
}

impl Decompressor for FseCodec {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Fse
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.decompressor.decompress(input)
    }

    fn decompress_to(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        self.decompressor.decompress_to(input, output)
    }
}

impl Codec for FseCodec {
    fn new() -> Self {
        Self::with_level(CompressionLevel::Default)
    }

    fn with_level(level: CompressionLevel) -> Self {
        let options: FrameOptions = level.into();
        Self {
            compressor: FseCompressor {
                level,
                options,
            },
            decompressor: FseDecompressor::with_options(options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_roundtrip() {
        let codec = <FseCodec as Codec>::new();
        let data = b"a codec should give back exactly what it was fed".repeat(20);
        assert!(codec.verify_roundtrip(&data).unwrap());
    }

    #[test]
    fn test_codec_levels_roundtrip() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 7) as u8 * 31).collect();
        for level in [
            CompressionLevel::None,
            CompressionLevel::Fast,
            CompressionLevel::Default,
            CompressionLevel::Best,
            CompressionLevel::Ultra,
        ] {
            let codec = FseCodec::with_level(level);
            assert!(codec.verify_roundtrip(&data).unwrap(), "{:?}", level);
        }
    }

    #[test]
    fn test_compress_to_respects_buffer() {
        let compressor = FseCompressor::new();
        let data = b"buffer bounds".repeat(100);

        let mut big = vec![0u8; compressor.max_compressed_size(data.len())];
        let written = compressor.compress_to(&data, &mut big).unwrap();
        assert!(written <= big.len());

        let mut tiny = [0u8; 4];
        let err = compressor.compress_to(&data, &mut tiny).unwrap_err();
        assert_eq!(err.category(), "buffer_too_small");
    }

    #[test]
    fn test_decompress_to_and_with_size() {
        let codec = <FseCodec as Codec>::new();
        let data = b"known output size".repeat(50);
        let compressed = codec.compress(&data).unwrap();

        let roundtrip = codec
            .decompressor
            .decompress_with_size(&compressed, data.len())
            .unwrap();
        assert_eq!(roundtrip, data);

        let mut tiny = [0u8; 4];
        let err = codec.decompress_to(&compressed, &mut tiny).unwrap_err();
        assert_eq!(err.category(), "buffer_too_small");
    }

    #[test]
    fn test_compressed_size_within_bound() {
        let compressor = FseCompressor::new();
        for len in [0usize, 1, 100, 100_000] {
            let data: Vec<u8> = (0..len).map(|i| (i * 131) as u8).collect();
            let compressed = compressor.compress(&data).unwrap();
            assert!(
                compressed.len() <= compressor.max_compressed_size(len),
                "len={}",
                len
            );
        }
    }

    #[test]
    fn test_stats_report_blocks_and_bits() {
        let compressor = FseCompressor::with_options(FrameOptions {
            block_size: 1024,
            ..FrameOptions::default()
        });
        let data = vec![7u8; 4096];
        let (compressed, stats) = compressor.compress_with_stats(&data).unwrap();

        assert_eq!(stats.original_size, data.len());
        assert_eq!(stats.compressed_size, compressed.len());
        assert_eq!(stats.blocks_processed, 4);
        // One dominant symbol: each block costs the size field, the final
        // state, and nothing per symbol.
        assert_eq!(stats.payload_bits, 4 * (32 + 12));
        assert_eq!(stats.ratio().original_size, data.len());
    }

    #[test]
    fn test_measure_ratio_on_compressible_data() {
        let codec = <FseCodec as Codec>::new();
        let data = vec![b'z'; 1 << 16];
        let ratio = codec.measure_ratio(&data).unwrap();
        assert!(ratio.is_effective());
    }
}
