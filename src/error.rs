use std::fmt::{Debug, Display, Formatter};

use crate::chunks::{ihdr::ColourMode, ChunkType};

/// Everything that can stop a decode.
///
/// All variants are terminal for the decode call that produced them.
pub enum DecodeError {
    Io(std::io::Error),
    Format(FormatError),
    Decompression(DecompressionError),
}

/// The field of a chunk record that ran out of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkField {
    Length,
    Type,
    Data,
    Crc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    BadMagic,
    Truncated(ChunkField),
    CrcMismatch {
        chunk_type: ChunkType,
        expected: u32,
        found: u32,
    },
    MissingHeader,
    FirstChunkNotHeader(ChunkType),
    HeaderSize(usize),
    ZeroDimension,
    InvalidColourMode(u8),
    InvalidBitDepth {
        colour_mode: ColourMode,
        bit_depth: u8,
    },
    UnknownCompressionMethod(u8),
    UnknownFilterMethod(u8),
    UnknownInterlaceMethod(u8),
    UnknownCriticalChunk(ChunkType),
    MissingImageData,
    InvalidFilterType(u8),
    ImageDataTooShort {
        expected: usize,
        found: usize,
    },
    ImageTooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecompressionError {
    /// The compressed stream ended before its logical end.
    Truncated,
    /// The compressed stream is corrupt or uses an unsupported feature.
    Corrupt(String),
}

impl Display for ChunkField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Length => write!(f, "length"),
            Self::Type => write!(f, "type"),
            Self::Data => write!(f, "data"),
            Self::Crc => write!(f, "CRC"),
        }
    }
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMagic => write!(f, "input doesn't start with the PNG signature"),
            Self::Truncated(field) => write!(f, "unexpected end of file @ chunk {field}"),
            Self::CrcMismatch {
                chunk_type,
                expected,
                found,
            } => write!(
                f,
                "CRC of {chunk_type} chunk does not match, expected {expected:#010x} but found {found:#010x}"
            ),
            Self::MissingHeader => write!(f, "no chunks after the PNG signature"),
            Self::FirstChunkNotHeader(chunk_type) => {
                write!(f, "first chunk type is not IHDR: {chunk_type}")
            }
            Self::HeaderSize(found) => write!(
                f,
                "IHDR content size mismatch, expecting {} but found {found}",
                crate::chunks::ihdr::HEADER_SIZE
            ),
            Self::ZeroDimension => write!(f, "neither width nor height may be zero"),
            Self::InvalidColourMode(value) => write!(f, "colour type {value} is not valid"),
            Self::InvalidBitDepth {
                colour_mode,
                bit_depth,
            } => write!(
                f,
                "colour type {} and bit depth {bit_depth} combination is not valid",
                *colour_mode as u8
            ),
            Self::UnknownCompressionMethod(value) => {
                write!(f, "unknown compression method {value}")
            }
            Self::UnknownFilterMethod(value) => write!(f, "unknown filter method {value}"),
            Self::UnknownInterlaceMethod(value) => write!(f, "unknown interlace method {value}"),
            Self::UnknownCriticalChunk(chunk_type) => {
                write!(f, "encountered unrecognized critical chunk: {chunk_type}")
            }
            Self::MissingImageData => write!(f, "no IDAT chunk in stream"),
            Self::InvalidFilterType(value) => write!(f, "scanline filter type {value} is not valid"),
            Self::ImageDataTooShort { expected, found } => write!(
                f,
                "filtered image data too short, expected {expected} bytes but found {found}"
            ),
            Self::ImageTooLarge => write!(f, "image dimensions overflow the address space"),
        }
    }
}

impl Display for DecompressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated => write!(f, "ran out of input to decompress"),
            Self::Corrupt(reason) => write!(f, "error inflating stream: {reason}"),
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::Format(err) => write!(f, "format error: {err}"),
            Self::Decompression(err) => write!(f, "decompression error: {err}"),
        }
    }
}

impl Debug for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for FormatError {}
impl std::error::Error for DecompressionError {}
impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Format(err) => Some(err),
            Self::Decompression(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<FormatError> for DecodeError {
    fn from(err: FormatError) -> Self {
        Self::Format(err)
    }
}

impl From<DecompressionError> for DecodeError {
    fn from(err: DecompressionError) -> Self {
        Self::Decompression(err)
    }
}
