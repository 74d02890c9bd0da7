//! # Stolas Core
//!
//! Core traits, types, and error handling for the Stolas entropy codec family.
//!
//! Stolas is named after the 36th demon of the Ars Goetia, a prince who
//! teaches the knowledge of hidden things - just as an entropy coder reduces
//! data to the hidden structure that remains once redundancy is stripped away.
//!
//! ## Design Philosophy
//!
//! - **Explicit failure**: every error is a distinct `Result` variant; the
//!   codecs never panic on malformed input and never silently truncate
//! - **Pure data tables**: coding tables are immutable after construction
//!   and shareable across encoders and decoders without synchronization
//! - **Monomorphized hot loops**: bit ordering is a compile-time parameter
//!   inside the codecs; runtime dispatch happens only at the top level
//!
//! ## Core Traits
//!
//! - [`Compressor`] - One-shot compression operations
//! - [`Decompressor`] - One-shot decompression operations
//! - [`Codec`] - Combined compress/decompress capability
//!
//! ## Example
//!
//! ```ignore
//! use stolas_core::{Codec, CompressionLevel};
//! use stolas_fse::FseCodec;
//!
//! let codec = FseCodec::with_level(CompressionLevel::Fast);
//! let compressed = codec.compress(data)?;
//! let original = codec.decompress(&compressed)?;
//! ```

pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use stats::{CompressionStats, Metrics};
pub use traits::{Codec, Compressor, Decompressor};
pub use types::{Algorithm, BitOrdering, CompressionLevel, CompressionRatio};
