use std::fmt::{Display, Formatter};

use nom::{number::complete::be_u32, number::complete::u8, sequence::tuple, IResult};

use super::{Chunk, ChunkType, ParseableChunk};
use crate::{error::FormatError, utils::div_ceil};

/// Size in bytes of the IHDR record on the wire.
pub const HEADER_SIZE: usize = 13;

/// Image metadata from the first chunk. Immutable once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub colour_mode: ColourMode,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColourMode {
    Greyscale = 0,
    Truecolour = 2,
    Indexed = 3,
    GreyscaleAlpha = 4,
    TruecolourAlpha = 6,
}

/// Per colour mode constants.
///
/// Bit `n` of `allowed_bit_depths` set means a depth of `1 << n` is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourProperties {
    pub name: &'static str,
    pub channel_count: u8,
    pub allowed_bit_depths: u8,
}

const GREYSCALE: ColourProperties = ColourProperties {
    name: "Greyscale",
    channel_count: 1,
    allowed_bit_depths: 0b00011111,
};
const TRUECOLOUR: ColourProperties = ColourProperties {
    name: "Truecolour",
    channel_count: 3,
    allowed_bit_depths: 0b00011000,
};
const INDEXED: ColourProperties = ColourProperties {
    name: "Indexed-colour",
    channel_count: 1,
    allowed_bit_depths: 0b00001111,
};
const GREYSCALE_ALPHA: ColourProperties = ColourProperties {
    name: "Greyscale with alpha",
    channel_count: 2,
    allowed_bit_depths: 0b00011000,
};
const TRUECOLOUR_ALPHA: ColourProperties = ColourProperties {
    name: "Truecolour with alpha",
    channel_count: 4,
    allowed_bit_depths: 0b00011000,
};

impl TryFrom<u8> for ColourMode {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Greyscale),
            2 => Ok(Self::Truecolour),
            3 => Ok(Self::Indexed),
            4 => Ok(Self::GreyscaleAlpha),
            6 => Ok(Self::TruecolourAlpha),
            _ => Err(FormatError::InvalidColourMode(value)),
        }
    }
}

impl ColourMode {
    pub const fn properties(self) -> ColourProperties {
        match self {
            Self::Greyscale => GREYSCALE,
            Self::Truecolour => TRUECOLOUR,
            Self::Indexed => INDEXED,
            Self::GreyscaleAlpha => GREYSCALE_ALPHA,
            Self::TruecolourAlpha => TRUECOLOUR_ALPHA,
        }
    }
}

impl ColourProperties {
    pub fn allows(&self, bit_depth: u8) -> bool {
        bit_depth.is_power_of_two()
            && bit_depth <= 16
            && self.allowed_bit_depths & (1 << bit_depth.trailing_zeros()) != 0
    }
}

impl ImageHeader {
    pub fn channel_count(&self) -> u8 {
        self.colour_mode.properties().channel_count
    }

    pub fn bits_per_pixel(&self) -> usize {
        self.bit_depth as usize * self.channel_count() as usize
    }

    /// Byte distance between the same byte of neighbouring pixels, at least one.
    pub fn stride(&self) -> usize {
        div_ceil(self.bits_per_pixel(), 8)
    }

    /// Packed row size for a row of `width` pixels, filter byte excluded.
    pub fn bytes_per_row_for(&self, width: usize) -> Option<usize> {
        width
            .checked_mul(self.bits_per_pixel())
            .map(|bits| div_ceil(bits, 8))
    }

    pub fn bytes_per_row(&self) -> Option<usize> {
        self.bytes_per_row_for(self.width as usize)
    }

    /// Size of the final raster, `None` if it overflows `usize`.
    pub fn raster_size(&self) -> Option<usize> {
        self.bytes_per_row()?.checked_mul(self.height as usize)
    }

    fn validate(self) -> Result<Self, FormatError> {
        if self.width == 0 || self.height == 0 {
            return Err(FormatError::ZeroDimension);
        }
        if !self.colour_mode.properties().allows(self.bit_depth) {
            return Err(FormatError::InvalidBitDepth {
                colour_mode: self.colour_mode,
                bit_depth: self.bit_depth,
            });
        }
        if self.compression_method != 0 {
            return Err(FormatError::UnknownCompressionMethod(self.compression_method));
        }
        if self.filter_method != 0 {
            return Err(FormatError::UnknownFilterMethod(self.filter_method));
        }
        Ok(self)
    }
}

type Fields = (u32, u32, u8, u8, u8, u8, u8);

fn parse_fields(data: &[u8]) -> IResult<&[u8], Fields> {
    tuple((be_u32, be_u32, u8, u8, u8, u8, u8))(data)
}

impl<'a> ParseableChunk<'a> for ImageHeader {
    const TYPE: ChunkType = ChunkType::IHDR;

    fn from_chunk(chunk: &Chunk<'a>) -> Result<Self, FormatError> {
        if chunk.chunk_type != Self::TYPE {
            return Err(FormatError::FirstChunkNotHeader(chunk.chunk_type));
        }
        if chunk.data.len() != HEADER_SIZE {
            return Err(FormatError::HeaderSize(chunk.data.len()));
        }
        let (_, (width, height, bit_depth, colour_mode, compression, filter, interlace)) =
            parse_fields(chunk.data).map_err(|_| FormatError::HeaderSize(chunk.data.len()))?;

        let interlace = match interlace {
            0 => false,
            1 => true,
            other => return Err(FormatError::UnknownInterlaceMethod(other)),
        };

        ImageHeader {
            width,
            height,
            bit_depth,
            colour_mode: colour_mode.try_into()?,
            compression_method: compression,
            filter_method: filter,
            interlace,
        }
        .validate()
    }
}

impl Display for ImageHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "IHDR content:")?;
        writeln!(f, "dimensions (WxH)   : {} x {}", self.width, self.height)?;
        writeln!(f, "bit depth          : {}", self.bit_depth)?;
        writeln!(
            f,
            "colour type        : {} ({})",
            self.colour_mode.properties().name,
            self.colour_mode as u8
        )?;
        writeln!(f, "compression method : DEFLATE ({})", self.compression_method)?;
        writeln!(f, "filter method      : Adaptive filtering ({})", self.filter_method)?;
        write!(
            f,
            "interlace method   : {}",
            if self.interlace {
                "Adam7 interlace (1)"
            } else {
                "No interlace (0)"
            }
        )
    }
}
