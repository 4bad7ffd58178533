use std::path::Path;

use crate::{chunks::ihdr::ImageHeader, decoder::PNGDecoder, error::DecodeError, options::DecodeOptions};

/// A decoded image: the validated header and the raw raster.
///
/// The raster is row-major, `height * bytes_per_row` bytes, with samples
/// packed exactly as the format stores them (sub-byte samples MSB first,
/// 16 bit samples big-endian). Palette indices are not expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PNG {
    pub(crate) header: ImageHeader,
    pub(crate) palette: Option<Vec<u8>>,
    pub(crate) pixels: Vec<u8>,
}

impl PNG {
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with_options(bytes, DecodeOptions::default())
    }

    pub fn decode_with_options(bytes: &[u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        let (decoder, header) = PNGDecoder::with_options(bytes, options)?.read_header()?;
        decoder.decode(header)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        Self::open_with_options(path, DecodeOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path)?;
        Self::decode_with_options(&bytes, options)
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    /// Raw PLTE entries, if the stream had a palette.
    pub fn palette(&self) -> Option<&[u8]> {
        self.palette.as_deref()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// Decodes an in-memory PNG stream into its raw raster.
pub fn decode(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    PNG::decode(bytes).map(PNG::into_pixels)
}

/// Reads and decodes the PNG file at `path` into its raw raster.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Vec<u8>, DecodeError> {
    PNG::open(path).map(PNG::into_pixels)
}
