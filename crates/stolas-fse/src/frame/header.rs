//! Per-block frame headers.
//!
//! Every block in a frame is self-describing: its header carries the symbol
//! count, the exact payload length in bits, the table size used, and the
//! full 256-entry histogram the coding tables are rebuilt from. All header
//! integers are little-endian u32.

use stolas_core::{Error, Result};

use crate::fse::{ALPHABET_SIZE, FSE_MAX_TABLE_LOG, FSE_MIN_TABLE_LOG};

/// Fixed size of a block header in bytes: three u32 fields plus the
/// 256-entry histogram.
pub const BLOCK_HEADER_SIZE: usize = 4 * 3 + 4 * ALPHABET_SIZE;

/// Parsed (or to-be-written) block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Number of symbols in this block.
    pub block_size: u32,
    /// Exact payload length in bits.
    pub bit_count: u32,
    /// Log2 of the state-table size used for this block.
    pub table_log: u32,
    /// Raw histogram, one entry per byte value.
    pub counts: [u32; ALPHABET_SIZE],
}

impl BlockHeader {
    /// Append the serialized header to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.reserve(BLOCK_HEADER_SIZE);
        out.extend_from_slice(&self.block_size.to_le_bytes());
        out.extend_from_slice(&self.bit_count.to_le_bytes());
        out.extend_from_slice(&self.table_log.to_le_bytes());
        for &count in &self.counts {
            out.extend_from_slice(&count.to_le_bytes());
        }
    }

    /// Parse a block header from the start of `data`.
    ///
    /// Returns the header and the number of bytes consumed.
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < BLOCK_HEADER_SIZE {
            return Err(Error::truncated(format!(
                "block header needs {} bytes, {} remain",
                BLOCK_HEADER_SIZE,
                data.len()
            )));
        }

        let block_size = read_le_u32(data, 0);
        let bit_count = read_le_u32(data, 4);
        let table_log = read_le_u32(data, 8);

        if !(FSE_MIN_TABLE_LOG..=FSE_MAX_TABLE_LOG).contains(&table_log) {
            return Err(Error::invalid_params(format!(
                "header table_log {} outside [{}, {}]",
                table_log, FSE_MIN_TABLE_LOG, FSE_MAX_TABLE_LOG
            )));
        }

        let mut counts = [0u32; ALPHABET_SIZE];
        for (i, count) in counts.iter_mut().enumerate() {
            *count = read_le_u32(data, 12 + 4 * i);
        }

        Ok((
            Self {
                block_size,
                bit_count,
                table_log,
                counts,
            },
            BLOCK_HEADER_SIZE,
        ))
    }

    /// Payload length in whole bytes, `bit_count / 8` rounded up.
    #[inline]
    pub fn payload_bytes(&self) -> usize {
        (self.bit_count as usize + 7) / 8
    }
}

#[inline]
fn read_le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
