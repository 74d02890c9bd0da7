//! FSE block decoder.
//!
//! The decoder reads the stream forwards: the initial state comes straight
//! off the wire, then each step emits the state's symbol and rebuilds the
//! next state from the entry's base plus freshly read bits. A stream that
//! was encoded correctly finishes in state 0; anything else is corruption.

use stolas_core::{Error, Result};

use crate::bitstream::BitRead;

use super::{FseTables, DATA_BLOCK_SIZE_BITS};

/// Pre-reservation cap for the output vector. Header-declared symbol counts
/// are untrusted; memory beyond this grows only as symbols actually decode.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Result of decoding one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeResult {
    /// Decoded symbols in original input order.
    pub symbols: Vec<u8>,
    /// Bits consumed from the reader, including the size field.
    pub bits_consumed: u64,
}

/// Block decoder: a borrow-style view over shared [`FseTables`].
#[derive(Debug, Clone, Copy)]
pub struct BlockDecoder<'a> {
    tables: &'a FseTables,
}

impl<'a> BlockDecoder<'a> {
    /// Create a decoder over the given tables.
    pub fn new(tables: &'a FseTables) -> Self {
        Self { tables }
    }

    /// Decode one block from `reader`.
    ///
    /// # Errors
    ///
    /// `DecodeTruncated` when the stream ends before the declared symbol
    /// count is produced; `DecodeInvalidState` when the stream decodes
    /// fully but does not finish in the terminal state.
    pub fn decode_block<R: BitRead>(&self, reader: &mut R) -> Result<DecodeResult> {
        let start = reader.position();

        let block_size = reader
            .read_bits(DATA_BLOCK_SIZE_BITS)
            .map_err(|_| Error::truncated("stream ends inside the block size field"))?;
        if block_size == 0 {
            return Ok(DecodeResult {
                symbols: Vec::new(),
                bits_consumed: (reader.position() - start) as u64,
            });
        }

        let mut state = reader
            .read_bits(self.tables.table_log())
            .map_err(|_| Error::truncated("stream ends inside the initial state field"))?;

        let mut symbols =
            Vec::with_capacity((block_size as usize).min(MAX_PREALLOCATION));
        for produced in 0..block_size {
            let entry = self.tables.decode_entry(state as usize);
            symbols.push(entry.symbol);

            let bits_val = if entry.nb_bits > 0 {
                reader.read_bits(u32::from(entry.nb_bits)).map_err(|_| {
                    Error::truncated(format!(
                        "stream ends after {} of {} symbols",
                        produced, block_size
                    ))
                })?
            } else {
                0
            };
            state = u32::from(entry.new_state_base) + bits_val;
        }

        // The dual of the encoder starting at table_size.
        if state != 0 {
            return Err(Error::invalid_state(state, 0));
        }

        Ok(DecodeResult {
            symbols,
            bits_consumed: (reader.position() - start) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::{BitWrite, LsbReader, LsbWriter, MsbReader, MsbWriter};
    use crate::fse::{BlockEncoder, FseParams, ALPHABET_SIZE};

    fn tables_for(data: &[u8], table_log: u32) -> FseTables {
        let mut counts = vec![0u32; ALPHABET_SIZE];
        for &b in data {
            counts[b as usize] += 1;
        }
        let params = FseParams::new(&counts, table_log).unwrap();
        FseTables::build(&params).unwrap()
    }

    fn roundtrip_msb(data: &[u8], table_log: u32) -> DecodeResult {
        let tables = tables_for(data, table_log);
        let block = BlockEncoder::new(&tables)
            .encode_block(data, MsbWriter::new())
            .unwrap();
        let mut reader = MsbReader::new(&block.bytes, block.bit_count as usize, 0);
        BlockDecoder::new(&tables).decode_block(&mut reader).unwrap()
    }

    #[test]
    fn test_roundtrip_small_blocks() {
        for data in [
            &b"a"[..],
            &b"ab"[..],
            &b"abacabad"[..],
            &b"the quick brown fox jumps over the lazy dog"[..],
        ] {
            let result = roundtrip_msb(data, 9);
            assert_eq!(result.symbols, data);
        }
    }

    #[test]
    fn test_roundtrip_lsb_ordering() {
        let data = b"lsb ordering lsb ordering lsb ordering".to_vec();
        let tables = tables_for(&data, 8);
        let block = BlockEncoder::new(&tables)
            .encode_block(&data, LsbWriter::new())
            .unwrap();
        let mut reader = LsbReader::new(&block.bytes, block.bit_count as usize, 0);
        let result = BlockDecoder::new(&tables).decode_block(&mut reader).unwrap();
        assert_eq!(result.symbols, data);
        assert_eq!(result.bits_consumed, block.bit_count);
    }

    #[test]
    fn test_bits_consumed_matches_decode_entries() {
        let data = b"exact bit accounting, every read counted".to_vec();
        let tables = tables_for(&data, 10);
        let block = BlockEncoder::new(&tables)
            .encode_block(&data, MsbWriter::new())
            .unwrap();

        // Re-walk the decode path summing nb_bits from the visited entries.
        let mut reader = MsbReader::new(&block.bytes, block.bit_count as usize, 0);
        let result = BlockDecoder::new(&tables).decode_block(&mut reader).unwrap();

        let mut replay = MsbReader::new(&block.bytes, block.bit_count as usize, 0);
        replay.read_bits(32).unwrap();
        let mut state = replay.read_bits(10).unwrap();
        let mut payload_bits = 0u64;
        for _ in 0..data.len() {
            let entry = tables.decode_entry(state as usize);
            payload_bits += u64::from(entry.nb_bits);
            let bits_val = replay.read_bits(u32::from(entry.nb_bits)).unwrap();
            state = u32::from(entry.new_state_base) + bits_val;
        }
        assert_eq!(result.bits_consumed, 32 + 10 + payload_bits);
        assert_eq!(block.bit_count, result.bits_consumed);
    }

    #[test]
    fn test_empty_block() {
        let tables = tables_for(b"y", 5);
        let block = BlockEncoder::new(&tables)
            .encode_block(&[], MsbWriter::new())
            .unwrap();
        let mut reader = MsbReader::new(&block.bytes, block.bit_count as usize, 0);
        let result = BlockDecoder::new(&tables).decode_block(&mut reader).unwrap();
        assert!(result.symbols.is_empty());
        assert_eq!(result.bits_consumed, 32);
    }

    #[test]
    fn test_truncated_stream_is_an_error() {
        let data = b"truncate me truncate me truncate me".to_vec();
        let tables = tables_for(&data, 9);
        let block = BlockEncoder::new(&tables)
            .encode_block(&data, MsbWriter::new())
            .unwrap();

        // Drop the final byte's worth of bits.
        let mut reader =
            MsbReader::new(&block.bytes, block.bit_count as usize - 8, 0);
        let err = BlockDecoder::new(&tables)
            .decode_block(&mut reader)
            .unwrap_err();
        assert_eq!(err.category(), "decode_truncated");
    }

    #[test]
    fn test_stream_too_short_for_header_fields() {
        let tables = tables_for(b"z", 5);
        let decoder = BlockDecoder::new(&tables);

        let mut reader = MsbReader::new(&[0xFF, 0xFF], 16, 0);
        let err = decoder.decode_block(&mut reader).unwrap_err();
        assert_eq!(err.category(), "decode_truncated");
    }

    #[test]
    fn test_nonzero_terminal_state_is_rejected() {
        // With a single-symbol alphabet every entry reads zero bits and
        // maps state u back to u, so a stream whose initial state is not 0
        // must finish in that same nonzero state.
        let tables = tables_for(&[b'A'; 16], 6);
        let mut writer = MsbWriter::new();
        writer.append_bits(1, 32);
        writer.append_bits(5, 6);
        let block = writer.finish();

        let mut reader = MsbReader::new(&block.bytes, block.bit_count as usize, 0);
        let err = BlockDecoder::new(&tables)
            .decode_block(&mut reader)
            .unwrap_err();
        assert_eq!(err.category(), "decode_invalid_state");
    }

    #[test]
    fn test_shared_tables_back_encoder_and_decoder() {
        // One tables value, used simultaneously by an encoder and a decoder.
        let data = b"shared tables shared tables".to_vec();
        let tables = tables_for(&data, 8);
        let encoder = BlockEncoder::new(&tables);
        let decoder = BlockDecoder::new(&tables);

        for _ in 0..3 {
            let block = encoder.encode_block(&data, MsbWriter::new()).unwrap();
            let mut reader = MsbReader::new(&block.bytes, block.bit_count as usize, 0);
            assert_eq!(decoder.decode_block(&mut reader).unwrap().symbols, data);
        }
    }
}
