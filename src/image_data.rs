use log::{debug, warn};

use crate::{
    chunks::{plte::Palette, ChunkReader, ChunkType, ParseableChunk},
    error::FormatError,
};

/// Everything the pipeline needs from the chunks after IHDR.
#[derive(Debug, Default)]
pub(crate) struct PackedImageData {
    /// All IDAT payloads, concatenated in file order.
    pub(crate) packed_data: Vec<u8>,
    pub(crate) palette: Option<Vec<u8>>,
    pub(crate) idat_chunks: usize,
}

/// Walks the chunk stream to its end, collecting image data.
///
/// Unknown ancillary chunks are skipped with a warning, unknown critical
/// chunks abort the decode.
pub(crate) fn pack_image_data(reader: ChunkReader<'_>) -> Result<PackedImageData, FormatError> {
    let mut packed = PackedImageData::default();
    for chunk in reader {
        let chunk = chunk?;
        match chunk.chunk_type {
            ChunkType::IDAT => {
                packed.packed_data.extend_from_slice(chunk.data);
                packed.idat_chunks += 1;
            }
            ChunkType::PLTE => {
                if packed.palette.is_none() {
                    packed.palette = Some(Palette::from_chunk(&chunk)?.entries.to_vec());
                }
            }
            ChunkType::IHDR | ChunkType::IEND => (),
            chunk_type if chunk_type.is_ancillary() => {
                warn!("Ignoring unrecognized ancillary chunk: {chunk}");
            }
            chunk_type => return Err(FormatError::UnknownCriticalChunk(chunk_type)),
        }
    }
    if packed.idat_chunks == 0 {
        return Err(FormatError::MissingImageData);
    }
    debug!(
        "packed {} bytes from {} IDAT chunks",
        packed.packed_data.len(),
        packed.idat_chunks
    );
    Ok(packed)
}
