//! FSE table construction.
//!
//! From normalized frequencies this module builds the three interlinked
//! structures the state machines run on:
//!
//! - the **spread**: which symbol owns each of the `table_size` state slots
//! - the **decode table**: per state, the symbol it emits plus the bit count
//!   and base for reconstructing the next state
//! - the **encode table** and **per-symbol transform**: the inverse mapping
//!   that walks the encoder from sub-range to sub-range
//!
//! The tables are read-only after construction. A single [`FseTables`] value
//! may back any number of encoders and decoders concurrently.

use stolas_core::{Error, Result};

use super::{floor_log2, FseParams};

/// A single entry in the FSE decode table. Exactly four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct DecodeEntry {
    /// Base value added to the read bits to obtain the next state.
    pub new_state_base: u16,
    /// Number of bits to read from the stream for the next state.
    pub nb_bits: u8,
    /// The symbol this state decodes to.
    pub symbol: u8,
}

/// Per-symbol encode transform.
///
/// `nb_out = (state + delta_nb_bits) >> 16` yields the number of bits the
/// encoder must shed for this symbol: either the symbol's maximum or one
/// less, depending on whether the state sits in the high half of the
/// symbol's sub-range. `delta_find_state` then relocates the shifted state
/// into the encode table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolTransform {
    /// Bias selecting the output bit count from the current state.
    pub delta_nb_bits: u32,
    /// Offset from the shifted state into the encode table.
    pub delta_find_state: i32,
}

/// The interlinked FSE coding tables for one normalized distribution.
#[derive(Debug, Clone)]
pub struct FseTables {
    table_log: u32,
    table_size: u32,
    spread: Vec<u8>,
    dtable: Vec<DecodeEntry>,
    etable: Vec<u16>,
    sym_tt: Vec<SymbolTransform>,
}

impl FseTables {
    /// Build the coding tables from normalized parameters.
    pub fn build(params: &FseParams) -> Result<Self> {
        let table_log = params.table_log();
        let table_size = params.table_size() as usize;
        let norm = params.normalized();

        let spread = spread_symbols(norm, table_size)?;

        // Decode table: walk the states in order, handing each occurrence of
        // a symbol the next value of its counter. The counter starts at the
        // normalized frequency so that the final occurrence lands exactly at
        // `2 * freq`, which is what makes the encoder's sub-range arithmetic
        // line up.
        let mut symbol_next: Vec<u32> = norm.to_vec();
        let mut dtable = vec![DecodeEntry::default(); table_size];
        for (state, entry) in dtable.iter_mut().enumerate() {
            let symbol = spread[state];
            let next = symbol_next[symbol as usize];
            symbol_next[symbol as usize] += 1;

            let nb_bits = table_log - floor_log2(next.max(1));
            let new_state_base = (next << nb_bits) - table_size as u32;
            *entry = DecodeEntry {
                new_state_base: new_state_base as u16,
                nb_bits: nb_bits as u8,
                symbol,
            };
        }

        // Encode table: the same walk in slot order, but recording where
        // each occurrence lives so the encoder can jump straight to it.
        let mut cumul = vec![0u32; norm.len()];
        let mut acc = 0u32;
        for (s, &freq) in norm.iter().enumerate() {
            cumul[s] = acc;
            acc += freq;
        }

        let mut etable = vec![0u16; table_size];
        let mut local_cumul = cumul.clone();
        for (state, &symbol) in spread.iter().enumerate() {
            let idx = local_cumul[symbol as usize];
            etable[idx as usize] = (table_size + state) as u16;
            local_cumul[symbol as usize] += 1;
        }

        // Per-symbol transforms.
        let mut sym_tt = vec![SymbolTransform::default(); norm.len()];
        let mut total = 0u32;
        for (s, &freq) in norm.iter().enumerate() {
            if freq == 0 {
                // Never dereferenced by a valid encode; filled so a stray
                // lookup stays in range instead of reading junk.
                sym_tt[s] = SymbolTransform {
                    delta_nb_bits: ((table_log + 1) << 16) - (1 << table_log),
                    delta_find_state: 0,
                };
                continue;
            }

            let max_bits_out = if freq > 1 {
                table_log - floor_log2(freq - 1)
            } else {
                table_log
            };
            let min_state_plus = freq << max_bits_out;
            sym_tt[s] = SymbolTransform {
                delta_nb_bits: (max_bits_out << 16) - min_state_plus,
                delta_find_state: total as i32 - freq as i32,
            };
            total += freq;
        }

        Ok(Self {
            table_log,
            table_size: table_size as u32,
            spread,
            dtable,
            etable,
            sym_tt,
        })
    }

    /// Log2 of the state-table size.
    #[inline]
    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    /// Number of state slots.
    #[inline]
    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    /// Number of symbols covered by the transform table.
    #[inline]
    pub fn alphabet_size(&self) -> usize {
        self.sym_tt.len()
    }

    /// The symbol owning each state slot.
    #[inline]
    pub fn spread(&self) -> &[u8] {
        &self.spread
    }

    /// Decode entry for a state in `[0, table_size)`.
    #[inline]
    pub fn decode_entry(&self, state: usize) -> &DecodeEntry {
        &self.dtable[state]
    }

    /// Encoder state stored at an encode-table index.
    #[inline]
    pub fn next_state(&self, index: usize) -> u16 {
        self.etable[index]
    }

    /// Encode transform for a symbol.
    #[inline]
    pub fn transform(&self, symbol: u8) -> SymbolTransform {
        self.sym_tt[symbol as usize]
    }
}

/// Distribute `norm[s]` copies of each symbol across the table with a
/// co-prime stride.
///
/// The stride visits every slot once per lap for most table sizes; a filled
/// slot advances the walk by another stride. For the degenerate sizes where
/// the stride divides the table (table_log 1 and 3) the walk cannot make
/// progress and falls back to a linear scan for the first empty slot.
fn spread_symbols(norm: &[u32], table_size: usize) -> Result<Vec<u8>> {
    let mask = table_size - 1;
    let step = (table_size >> 1) + (table_size >> 3) + 3;

    let mut spread = vec![0u8; table_size];
    let mut filled = vec![false; table_size];
    let mut pos = 0usize;

    for (symbol, &freq) in norm.iter().enumerate() {
        for _ in 0..freq {
            if filled[pos] {
                let start = pos;
                let mut attempts = 0usize;
                loop {
                    pos = (pos + step) & mask;
                    if !filled[pos] {
                        break;
                    }
                    attempts += 1;
                    if attempts >= table_size || pos == start {
                        pos = filled.iter().position(|&f| !f).ok_or_else(|| {
                            Error::invalid_params("spread table has no empty slot")
                        })?;
                        break;
                    }
                }
            }
            filled[pos] = true;
            spread[pos] = symbol as u8;
            pos = (pos + step) & mask;
        }
    }

    debug_assert!(filled.iter().all(|&f| f));
    Ok(spread)
}
