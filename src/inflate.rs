use log::debug;
use miniz_oxide::inflate::{
    core::{decompress, inflate_flags, DecompressorOxide},
    TINFLStatus,
};

use crate::error::DecompressionError;

const MIN_SIZE_HINT: usize = 1024;

/// Inflates a zlib stream whose output may not exceed `limit` bytes.
///
/// The output buffer starts at `size_hint` bytes (twice the input when not
/// given), clamped to `limit`. It doubles whenever the decompressor runs out
/// of room, never past `limit`, and is truncated to the real length once the
/// stream ends. A stream that still has output once `limit` bytes are
/// written is rejected.
pub(crate) fn inflate(
    input: &[u8],
    size_hint: Option<usize>,
    limit: usize,
) -> Result<Vec<u8>, DecompressionError> {
    let flags = inflate_flags::TINFL_FLAG_PARSE_ZLIB_HEADER
        | inflate_flags::TINFL_FLAG_COMPUTE_ADLER32
        | inflate_flags::TINFL_FLAG_USING_NON_WRAPPING_OUTPUT_BUF;
    let initial = size_hint
        .unwrap_or_else(|| input.len().saturating_mul(2))
        .max(MIN_SIZE_HINT)
        .min(limit);

    let mut out = Vec::new();
    grow(&mut out, initial)?;
    let mut decompressor = Box::<DecompressorOxide>::default();
    let (mut in_pos, mut out_pos) = (0, 0);
    loop {
        let (status, consumed, written) =
            decompress(&mut decompressor, &input[in_pos..], &mut out, out_pos, flags);
        in_pos += consumed;
        out_pos += written;

        match status {
            TINFLStatus::Done => {
                out.truncate(out_pos);
                debug!("inflated {} bytes into {}", in_pos, out_pos);
                return Ok(out);
            }
            TINFLStatus::HasMoreOutput if out.len() >= limit => {
                return Err(DecompressionError::Corrupt(format!(
                    "stream inflates past the expected {limit} bytes"
                )))
            }
            TINFLStatus::HasMoreOutput => {
                let size = out.len().saturating_mul(2).min(limit);
                grow(&mut out, size)?;
            }
            TINFLStatus::NeedsMoreInput | TINFLStatus::FailedCannotMakeProgress => {
                return Err(DecompressionError::Truncated)
            }
            status => return Err(DecompressionError::Corrupt(format!("{status:?}"))),
        }
    }
}

fn grow(out: &mut Vec<u8>, size: usize) -> Result<(), DecompressionError> {
    out.try_reserve_exact(size - out.len()).map_err(|_| {
        DecompressionError::Corrupt(format!("cannot allocate {size} bytes of output"))
    })?;
    out.resize(size, 0);
    Ok(())
}
