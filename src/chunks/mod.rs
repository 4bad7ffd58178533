//! Framing of the chunk stream that follows the PNG signature.
//!
//! Every record is `length | type | data | crc`, big-endian throughout.

use std::fmt::{Debug, Display, Formatter};

use log::debug;
use nom::{
    bytes::complete::{tag, take},
    number::complete::be_u32,
    IResult,
};

use crate::error::{ChunkField, FormatError};

pub(crate) mod crc;
pub mod ihdr;
pub(crate) mod plte;

pub(crate) const SIGNATURE: &[u8; 8] = b"\x89PNG\x0d\x0a\x1a\x0a";

/// Four ASCII bytes naming a chunk.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const PLTE: Self = Self(*b"PLTE");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");

    /// The type code packed big-endian, as it appears on the wire.
    pub const fn code(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Bit 5 of the first byte marks a chunk a decoder may skip.
    pub const fn is_ancillary(self) -> bool {
        self.0[0] & (1 << 5) != 0
    }

    pub fn is_known_critical(self) -> bool {
        matches!(self, Self::IHDR | Self::PLTE | Self::IDAT | Self::IEND)
    }
}

impl Display for ChunkType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl Debug for ChunkType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChunkType({self})")
    }
}

/// One framed record. The data borrows from the input stream.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub length: u32,
    pub chunk_type: ChunkType,
    pub data: &'a [u8],
    pub crc: u32,
}

impl Display for Chunk<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#x}), ", self.chunk_type, self.chunk_type.code())?;
        if self.length == 0 {
            write!(f, "empty")
        } else {
            write!(f, "{} bytes", self.length)
        }
    }
}

/// Chunks this crate knows how to interpret.
pub(crate) trait ParseableChunk<'a>: Sized {
    const TYPE: ChunkType;

    fn from_chunk(chunk: &Chunk<'a>) -> Result<Self, FormatError>;
}

type ParseResult<'a, O> = IResult<&'a [u8], O, nom::error::Error<&'a [u8]>>;

fn take_field<O>(result: ParseResult<'_, O>, field: ChunkField) -> Result<(&[u8], O), FormatError> {
    result.map_err(|_| FormatError::Truncated(field))
}

/// Checks the fixed 8 byte signature and returns the bytes after it.
pub fn read_magic(input: &[u8]) -> Result<&[u8], FormatError> {
    let parsed: ParseResult<'_, &[u8]> = tag(&SIGNATURE[..])(input);
    parsed
        .map(|(rest, _)| rest)
        .map_err(|_| FormatError::BadMagic)
}

/// Sequential reader over the chunk records of a PNG stream.
///
/// Once a read fails the reader yields nothing more: a truncated stream
/// cannot be resynchronised.
pub struct ChunkReader<'a> {
    input: &'a [u8],
    verify_crc: bool,
    finished: bool,
}

impl<'a> ChunkReader<'a> {
    pub fn new(input: &'a [u8], verify_crc: bool) -> Self {
        Self {
            input,
            verify_crc,
            finished: false,
        }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.input
    }

    pub fn is_exhausted(&self) -> bool {
        self.finished || self.input.is_empty()
    }

    pub fn read_chunk(&mut self) -> Result<Chunk<'a>, FormatError> {
        match self.parse_chunk() {
            Ok((rest, chunk)) => {
                self.input = rest;
                debug!("parsed chunk: {chunk}");
                Ok(chunk)
            }
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }

    fn parse_chunk(&self) -> Result<(&'a [u8], Chunk<'a>), FormatError> {
        let input = self.input;
        let (input, length) = take_field(be_u32(input), ChunkField::Length)?;
        let (input, code) = take_field(be_u32(input), ChunkField::Type)?;
        let (input, data) = take_field(take(length as usize)(input), ChunkField::Data)?;
        let (input, crc) = take_field(be_u32(input), ChunkField::Crc)?;
        let chunk_type = ChunkType(code.to_be_bytes());

        if self.verify_crc {
            let found = crc::chunk_crc(&chunk_type.0, data);
            if found != crc {
                return Err(FormatError::CrcMismatch {
                    chunk_type,
                    expected: crc,
                    found,
                });
            }
        }

        Ok((
            input,
            Chunk {
                length,
                chunk_type,
                data,
                crc,
            },
        ))
    }
}

impl<'a> Iterator for ChunkReader<'a> {
    type Item = Result<Chunk<'a>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }
        Some(self.read_chunk())
    }
}
