//! FSE block encoder.
//!
//! The encoder walks the input *backwards* so the decoder can emit symbols
//! forwards: each step sheds the low bits of the state, then jumps through
//! the encode table into the next symbol's sub-range. The shed bit chunks
//! are buffered and flushed in reverse at the end, which puts them in
//! original input order on the wire.

use stolas_core::{Error, Result};

use crate::bitstream::{bit_mask, BitWrite, EncodedBlock};

use super::{FseTables, DATA_BLOCK_SIZE_BITS};

/// Block encoder: a borrow-style view over shared [`FseTables`].
///
/// Holds no mutable state of its own; per-block state lives on the stack of
/// [`encode_block`](Self::encode_block). Symbols must be drawn from the
/// histogram the tables were built from.
#[derive(Debug, Clone, Copy)]
pub struct BlockEncoder<'a> {
    tables: &'a FseTables,
}

impl<'a> BlockEncoder<'a> {
    /// Create an encoder over the given tables.
    pub fn new(tables: &'a FseTables) -> Self {
        Self { tables }
    }

    /// Encode a symbol block into `writer`, returning the finished stream.
    ///
    /// The payload layout is: 32-bit symbol count, then (for non-empty
    /// blocks) the final state offset in `table_log` bits, then the
    /// per-symbol bit chunks in input order. Exactly
    /// `32 + table_log + sum(nb_out)` bits are written for a non-empty
    /// block.
    pub fn encode_block<W: BitWrite>(&self, symbols: &[u8], mut writer: W) -> Result<EncodedBlock> {
        if symbols.len() > u32::MAX as usize {
            return Err(Error::invalid_params(format!(
                "block of {} symbols exceeds the 32-bit size field",
                symbols.len()
            )));
        }
        writer.append_bits(symbols.len() as u32, DATA_BLOCK_SIZE_BITS);
        if symbols.is_empty() {
            return Ok(writer.finish());
        }

        let table_size = self.tables.table_size();
        let mut state = table_size;
        let mut chunk_vals: Vec<u32> = Vec::with_capacity(symbols.len());
        let mut chunk_bits: Vec<u32> = Vec::with_capacity(symbols.len());

        for &symbol in symbols.iter().rev() {
            debug_assert!(
                (symbol as usize) < self.tables.alphabet_size(),
                "symbol {} outside table alphabet",
                symbol
            );
            let tr = self.tables.transform(symbol);

            let nb_out = (state + tr.delta_nb_bits) >> 16;
            chunk_vals.push(state & bit_mask(nb_out));
            chunk_bits.push(nb_out);

            let idx = (state >> nb_out).wrapping_add(tr.delta_find_state as u32);
            state = u32::from(self.tables.next_state(idx as usize));
        }

        debug_assert!(
            state >= table_size && state < 2 * table_size,
            "terminal state {} outside [{}, {})",
            state,
            table_size,
            2 * table_size
        );
        writer.append_bits(state - table_size, self.tables.table_log());

        // Chunks were recorded walking backwards; flushing them in reverse
        // restores input order for the decoder.
        for (&value, &nbits) in chunk_vals.iter().zip(chunk_bits.iter()).rev() {
            if nbits > 0 {
                writer.append_bits(value, nbits);
            }
        }

        Ok(writer.finish())
    }
}
