use std::marker::PhantomData;

use log::debug;

use crate::{
    chunks::{ihdr::ImageHeader, read_magic, ChunkReader, ParseableChunk},
    error::{DecodeError, FormatError},
    image_data::{pack_image_data, PackedImageData},
    inflate::inflate,
    interlacing::deinterlace,
    options::DecodeOptions,
    png::PNG,
    scanlines::{filtered_size, unfilter},
};

/// Pipeline driver whose type tracks how far into the stream it has read.
pub struct PNGDecoder<'a, State> {
    input: &'a [u8],
    options: DecodeOptions,
    _state: PhantomData<State>,
}

/// Signature checked, IHDR not yet read.
pub struct Start;
/// IHDR read and validated, positioned at the second chunk.
pub struct Chunks;

impl<'a> PNGDecoder<'a, Start> {
    pub fn new(data: &'a [u8]) -> Result<Self, DecodeError> {
        Self::with_options(data, DecodeOptions::default())
    }

    pub fn with_options(data: &'a [u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        let rest = read_magic(data)?;
        Ok(Self {
            input: rest,
            options,
            _state: PhantomData,
        })
    }

    /// Reads the first chunk, which has to be a valid IHDR.
    pub fn read_header(self) -> Result<(PNGDecoder<'a, Chunks>, ImageHeader), DecodeError> {
        let mut reader = ChunkReader::new(self.input, self.options.verify_crc);
        if reader.is_exhausted() {
            return Err(FormatError::MissingHeader.into());
        }
        let chunk = reader.read_chunk()?;
        let header = ImageHeader::from_chunk(&chunk)?;
        debug!("\n{header}");

        Ok((
            PNGDecoder {
                input: reader.remaining(),
                options: self.options,
                _state: PhantomData,
            },
            header,
        ))
    }
}

impl<'a> PNGDecoder<'a, Chunks> {
    /// Runs the rest of the pipeline: aggregation, decompression,
    /// unfiltering and, for interlaced images, Adam7 resolution.
    pub fn decode(self, header: ImageHeader) -> Result<PNG, DecodeError> {
        let PackedImageData {
            packed_data,
            palette,
            ..
        } = pack_image_data(ChunkReader::new(self.input, self.options.verify_crc))?;

        let expected = filtered_size(&header)?;
        let filtered = inflate(&packed_data, self.options.inflate_size_hint, expected)?;
        debug!("inflated size: {}", filtered.len());

        let mut reduced = unfilter(&filtered, &header)?;
        let pixels = if header.interlace {
            deinterlace(&reduced, &header)?
        } else {
            // Without interlacing the single reduced image is the raster.
            reduced.pop().map(|image| image.data).unwrap_or_default()
        };
        debug!("raw size: {}", pixels.len());

        Ok(PNG {
            header,
            palette,
            pixels,
        })
    }
}
