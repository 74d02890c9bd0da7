//! Normalization of symbol histograms onto a power-of-two state budget.

use stolas_core::{Error, Result};
use tracing::warn;

use super::{ALPHABET_SIZE, DATA_BLOCK_SIZE_BITS, FSE_MAX_TABLE_LOG, FSE_MIN_TABLE_LOG};

/// Coding parameters derived from a raw symbol histogram.
///
/// Normalization distributes `table_size = 1 << table_log` state slots
/// across the alphabet proportionally to the observed counts, with every
/// present symbol guaranteed at least one slot. The normalized vector sums
/// to exactly `table_size`; table construction depends on that invariant.
///
/// A block can only be coded exactly when its number of distinct symbols
/// does not exceed `table_size`. When it does, normalization falls back to
/// assigning the whole budget to the dominant symbol so the sum invariant
/// survives; such parameters cannot faithfully encode the minority symbols.
#[derive(Debug, Clone)]
pub struct FseParams {
    counts: Vec<u32>,
    table_log: u32,
    table_size: u32,
    normalized: Vec<u32>,
    data_block_size_bits: u32,
}

impl FseParams {
    /// Normalize `counts` onto a `1 << table_log` state budget.
    ///
    /// # Errors
    ///
    /// `InvalidParams` when the histogram is empty or all-zero, wider than
    /// the 256-symbol alphabet, or `table_log` is outside `[1, 15]`.
    pub fn new(counts: &[u32], table_log: u32) -> Result<Self> {
        if counts.is_empty() {
            return Err(Error::invalid_params("histogram must not be empty"));
        }
        if counts.len() > ALPHABET_SIZE {
            return Err(Error::invalid_params(format!(
                "alphabet size {} exceeds {}",
                counts.len(),
                ALPHABET_SIZE
            )));
        }
        if !(FSE_MIN_TABLE_LOG..=FSE_MAX_TABLE_LOG).contains(&table_log) {
            return Err(Error::invalid_params(format!(
                "table_log {} outside [{}, {}]",
                table_log, FSE_MIN_TABLE_LOG, FSE_MAX_TABLE_LOG
            )));
        }

        let total: u64 = counts.iter().map(|&c| c as u64).sum();
        if total == 0 {
            return Err(Error::invalid_params("total frequency is zero"));
        }

        let table_size = 1u32 << table_log;
        let normalized = normalize(counts, total, table_size);

        debug_assert_eq!(
            normalized.iter().map(|&n| n as u64).sum::<u64>(),
            table_size as u64
        );

        Ok(Self {
            counts: counts.to_vec(),
            table_log,
            table_size,
            normalized,
            data_block_size_bits: DATA_BLOCK_SIZE_BITS,
        })
    }

    /// The raw histogram these parameters were derived from.
    #[inline]
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Log2 of the state-table size.
    #[inline]
    pub fn table_log(&self) -> u32 {
        self.table_log
    }

    /// Number of state slots, `1 << table_log`.
    #[inline]
    pub fn table_size(&self) -> u32 {
        self.table_size
    }

    /// Normalized frequencies summing to `table_size`.
    #[inline]
    pub fn normalized(&self) -> &[u32] {
        &self.normalized
    }

    /// Width in bits of the encoded per-block symbol-count field.
    #[inline]
    pub fn data_block_size_bits(&self) -> u32 {
        self.data_block_size_bits
    }

    /// Encoder start and end state. The live state range during encoding is
    /// `[table_size, 2 * table_size)`.
    #[inline]
    pub fn initial_state(&self) -> u32 {
        self.table_size
    }

    /// Number of symbols in the alphabet covered by these parameters.
    #[inline]
    pub fn alphabet_size(&self) -> usize {
        self.counts.len()
    }
}

fn normalize(counts: &[u32], total: u64, table_size: u32) -> Vec<u32> {
    let mut normalized = vec![0u32; counts.len()];
    let mut allocated: u64 = 0;

    // Proportional allocation, unbiased rounding, floor of 1 per present
    // symbol.
    for (i, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let exact = count as f64 * table_size as f64 / total as f64;
        let share = round_ties_to_even(exact).max(1);
        normalized[i] = share;
        allocated += share as u64;
    }

    let mut diff = table_size as i64 - allocated as i64;
    if diff == 0 {
        return normalized;
    }

    // Close the gap one unit per visited symbol, most frequent first, so
    // the perturbation stays proportional to contribution. sort_by is
    // stable; equal counts keep symbol order for reproducibility.
    let mut order: Vec<usize> = (0..counts.len()).filter(|&s| counts[s] > 0).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]));

    while diff != 0 {
        let mut changed = false;
        for &s in &order {
            if diff > 0 {
                normalized[s] += 1;
                diff -= 1;
                changed = true;
            } else if normalized[s] > 1 {
                normalized[s] -= 1;
                diff += 1;
                changed = true;
            }
            if diff == 0 {
                break;
            }
        }
        if !changed {
            break;
        }
    }

    if diff != 0 {
        // More distinct symbols than state slots: no assignment satisfies
        // both the floor and the sum. Keep the sum invariant by collapsing
        // the whole budget onto the dominant symbol.
        let dominant = counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, &c)| c)
            .map(|(i, _)| i)
            .unwrap_or(0);
        warn!(
            table_size,
            distinct = order.len(),
            dominant,
            "normalization infeasible; collapsing histogram onto dominant symbol"
        );
        normalized.iter_mut().for_each(|n| *n = 0);
        normalized[dominant] = table_size;
    }

    normalized
}

/// Round half-to-even, matching the rounding of the proportional shares in
/// the reference normalization.
fn round_ties_to_even(x: f64) -> u32 {
    let floor = x.floor();
    let frac = x - floor;
    if frac > 0.5 {
        return (floor + 1.0) as u32;
    }
    if frac < 0.5 {
        return floor as u32;
    }
    if (floor as u64) & 1 == 1 {
        (floor + 1.0) as u32
    } else {
        floor as u32
    }
}
