//! A from-scratch PNG decoder producing the raw sample raster.

mod chunks;
mod decoder;
mod error;
mod filters;
mod image_data;
mod inflate;
mod interlacing;
mod options;
mod png;
pub mod pnm;
mod scanlines;
mod utils;

pub use chunks::{
    ihdr::{ColourMode, ColourProperties, ImageHeader},
    read_magic, Chunk, ChunkReader, ChunkType,
};
pub use decoder::{Chunks, PNGDecoder, Start};
pub use error::{ChunkField, DecodeError, DecompressionError, FormatError};
pub use filters::{paeth, Filter};
pub use interlacing::{Pass, PASSES};
pub use options::DecodeOptions;
pub use png::{decode, decode_file, PNG};
