//! Self-describing block frames.
//!
//! A frame is a concatenation of independent block records. Each record is
//! a fixed 1036-byte header (symbol count, payload bit length, table size,
//! and the full 256-entry histogram) followed by the block-codec payload.
//! Blocks share no state: every one rebuilds its coding tables from its
//! own header, so any block can be decoded knowing only the bit ordering.
//!
//! There is no frame-level magic number or checksum; a collaborator may
//! wrap the frame if it needs those.

mod header;
mod levels;

pub use header::{BlockHeader, BLOCK_HEADER_SIZE};
pub use levels::options_for_level;

use stolas_core::{BitOrdering, Error, Result};
use tracing::{debug, trace};

use crate::bitstream::{
    BitRead, BitWrite, EncodedBlock, LsbReader, LsbWideWriter, LsbWriter, MsbReader, MsbWriter,
};
use crate::fse::{
    BlockDecoder, BlockEncoder, FseParams, FseTables, ALPHABET_SIZE, DATA_BLOCK_SIZE_BITS,
    FSE_MAX_TABLE_LOG, FSE_MIN_TABLE_LOG,
};

/// Frame encoding/decoding options.
///
/// On the decode side only `ordering` is consulted: each block header
/// carries its own `table_log`, which overrides any caller hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    /// Maximum symbols per block; 0 puts the entire input in one block.
    pub block_size: usize,
    /// Log2 of the state-table size used when encoding.
    pub table_log: u32,
    /// Bit ordering of block payloads. Encoder and decoder must agree.
    pub ordering: BitOrdering,
    /// Use the word-flushing LSB writer. Output bytes are identical to the
    /// byte-flushing writer; only throughput differs. Ignored for MSB.
    pub wide_writer: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            block_size: 32 * 1024,
            table_log: 12,
            ordering: BitOrdering::Msb,
            wide_writer: false,
        }
    }
}

/// Encode `input` into a framed stream of self-describing blocks.
pub fn encode_stream(input: &[u8], opts: &FrameOptions) -> Result<Vec<u8>> {
    if !(FSE_MIN_TABLE_LOG..=FSE_MAX_TABLE_LOG).contains(&opts.table_log) {
        return Err(Error::invalid_params(format!(
            "table_log {} outside [{}, {}]",
            opts.table_log, FSE_MIN_TABLE_LOG, FSE_MAX_TABLE_LOG
        )));
    }
    debug!(
        input_len = input.len(),
        block_size = opts.block_size,
        table_log = opts.table_log,
        ordering = opts.ordering.name(),
        wide = opts.wide_writer,
        "encoding frame"
    );

    let mut out = Vec::new();

    if input.is_empty() {
        // A single empty record: the payload is just the 32-bit zero count.
        // Table construction is skipped since an all-zero histogram has no
        // normalization.
        let block = encode_empty_block(opts);
        let header = BlockHeader {
            block_size: 0,
            bit_count: block.bit_count as u32,
            table_log: opts.table_log,
            counts: [0u32; ALPHABET_SIZE],
        };
        header.write_to(&mut out);
        out.extend_from_slice(&block.bytes);
        return Ok(out);
    }

    let block_size = if opts.block_size == 0 {
        input.len()
    } else {
        opts.block_size
    };

    let mut pos = 0usize;
    while pos < input.len() {
        let chunk = &input[pos..input.len().min(pos + block_size)];

        let mut counts = [0u32; ALPHABET_SIZE];
        for &byte in chunk {
            counts[byte as usize] += 1;
        }

        let params = FseParams::new(&counts, opts.table_log)?;
        let tables = FseTables::build(&params)?;
        let encoder = BlockEncoder::new(&tables);

        // Payload upper bound: size field, final state, table_log bits per
        // symbol.
        let estimate = (chunk.len() * opts.table_log as usize) / 8 + 16;
        let block = match (opts.ordering, opts.wide_writer) {
            (BitOrdering::Msb, _) => {
                encoder.encode_block(chunk, MsbWriter::with_capacity(estimate))?
            }
            (BitOrdering::Lsb, false) => {
                encoder.encode_block(chunk, LsbWriter::with_capacity(estimate))?
            }
            (BitOrdering::Lsb, true) => {
                encoder.encode_block(chunk, LsbWideWriter::with_capacity(estimate))?
            }
        };
        if block.bit_count > u64::from(u32::MAX) {
            return Err(Error::invalid_params(format!(
                "block payload of {} bits exceeds the 32-bit header field",
                block.bit_count
            )));
        }

        let header = BlockHeader {
            block_size: chunk.len() as u32,
            bit_count: block.bit_count as u32,
            table_log: opts.table_log,
            counts,
        };
        header.write_to(&mut out);
        out.extend_from_slice(&block.bytes);

        trace!(
            offset = pos,
            symbols = chunk.len(),
            payload_bits = block.bit_count,
            "encoded block"
        );
        pos += chunk.len();
    }

    Ok(out)
}

/// Decode a framed stream back to the original bytes.
///
/// Walks records until the buffer is exhausted. Any malformed block fails
/// the whole call; output never extends past the last fully-decoded block.
pub fn decode_stream(data: &[u8], opts: &FrameOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    let mut blocks = 0usize;

    while pos < data.len() {
        let (header, consumed) = BlockHeader::parse(&data[pos..])?;
        pos += consumed;

        let payload_len = header.payload_bytes();
        if data.len() - pos < payload_len {
            return Err(Error::truncated_at(
                format!(
                    "block payload needs {} bytes, {} remain",
                    payload_len,
                    data.len() - pos
                ),
                pos,
            ));
        }
        let payload = &data[pos..pos + payload_len];

        if header.block_size == 0 {
            // Empty record: the payload must still declare zero symbols.
            let declared = read_declared_block_size(payload, &header, opts.ordering)?;
            if declared != 0 {
                return Err(Error::truncated_at(
                    format!("empty block declares {} symbols in payload", declared),
                    pos,
                ));
            }
        } else {
            let params = FseParams::new(&header.counts, header.table_log)?;
            let tables = FseTables::build(&params)?;
            let decoder = BlockDecoder::new(&tables);

            let result = match opts.ordering {
                BitOrdering::Msb => {
                    let mut reader = MsbReader::new(payload, header.bit_count as usize, 0);
                    decoder.decode_block(&mut reader)?
                }
                BitOrdering::Lsb => {
                    let mut reader = LsbReader::new(payload, header.bit_count as usize, 0);
                    decoder.decode_block(&mut reader)?
                }
            };
            if result.symbols.len() != header.block_size as usize {
                return Err(Error::truncated_at(
                    format!(
                        "block decoded {} symbols but header declares {}",
                        result.symbols.len(),
                        header.block_size
                    ),
                    pos,
                ));
            }
            out.extend_from_slice(&result.symbols);
        }

        pos += payload_len;
        blocks += 1;
    }

    debug!(blocks, output_len = out.len(), "decoded frame");
    Ok(out)
}

fn encode_empty_block(opts: &FrameOptions) -> EncodedBlock {
    match (opts.ordering, opts.wide_writer) {
        (BitOrdering::Msb, _) => {
            let mut writer = MsbWriter::new();
            writer.append_bits(0, DATA_BLOCK_SIZE_BITS);
            writer.finish()
        }
        (BitOrdering::Lsb, false) => {
            let mut writer = LsbWriter::new();
            writer.append_bits(0, DATA_BLOCK_SIZE_BITS);
            writer.finish()
        }
        (BitOrdering::Lsb, true) => {
            let mut writer = LsbWideWriter::new();
            writer.append_bits(0, DATA_BLOCK_SIZE_BITS);
            writer.finish()
        }
    }
}

fn read_declared_block_size(
    payload: &[u8],
    header: &BlockHeader,
    ordering: BitOrdering,
) -> Result<u32> {
    match ordering {
        BitOrdering::Msb => {
            let mut reader = MsbReader::new(payload, header.bit_count as usize, 0);
            reader
                .read_bits(DATA_BLOCK_SIZE_BITS)
                .map_err(|_| Error::truncated("payload ends inside the block size field"))
        }
        BitOrdering::Lsb => {
            let mut reader = LsbReader::new(payload, header.bit_count as usize, 0);
            reader
                .read_bits(DATA_BLOCK_SIZE_BITS)
                .map_err(|_| Error::truncated("payload ends inside the block size field"))
        }
    }
}
