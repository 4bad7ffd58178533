use super::{Chunk, ChunkType, ParseableChunk};
use crate::error::FormatError;

/// Raw palette entries, passed through without interpretation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette<'a> {
    pub(crate) entries: &'a [u8],
}

impl<'a> ParseableChunk<'a> for Palette<'a> {
    const TYPE: ChunkType = ChunkType::PLTE;

    fn from_chunk(chunk: &Chunk<'a>) -> Result<Self, FormatError> {
        Ok(Palette {
            entries: chunk.data,
        })
    }
}
