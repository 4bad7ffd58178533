//! ASCII Netpbm dumps of a decoded raster, mostly for eyeballing output.
//!
//! Greyscale and indexed images become `P2`, truecolour images `P3`. Alpha
//! channels are dropped and palette indices are written as grey levels.

use std::io::{self, Write};

use crate::{chunks::ihdr::ColourMode, png::PNG};

/// Unpacks the samples of one raster row, MSB first for sub-byte depths
/// and big-endian for 16 bit ones. Row padding is not trimmed.
pub fn samples(row: &[u8], bit_depth: u8) -> impl Iterator<Item = u16> + '_ {
    let depth = bit_depth as usize;
    let mask = ((1u32 << depth) - 1) as u16;
    (0..row.len() * 8 / depth).map(move |i| {
        let bit = i * depth;
        match depth {
            16 => u16::from_be_bytes([row[bit / 8], row[bit / 8 + 1]]),
            8 => row[bit / 8] as u16,
            _ => (row[bit / 8] as u16 >> (8 - depth - bit % 8)) & mask,
        }
    })
}

pub fn write_ascii<W: Write>(png: &PNG, mut out: W) -> io::Result<()> {
    let header = png.header();
    let (magic, kept) = match header.colour_mode {
        ColourMode::Greyscale | ColourMode::Indexed | ColourMode::GreyscaleAlpha => ("P2", 1),
        ColourMode::Truecolour | ColourMode::TruecolourAlpha => ("P3", 3),
    };
    let channels = header.channel_count() as usize;
    let width = header.width as usize;

    writeln!(out, "{magic}")?;
    writeln!(out, "{} {}", header.width, header.height)?;
    writeln!(out, "{}", (1u32 << header.bit_depth) - 1)?;

    let bytes_per_row = png.pixels().len() / header.height as usize;
    for row in png.pixels().chunks_exact(bytes_per_row) {
        let row_samples = samples(row, header.bit_depth)
            .take(width * channels)
            .collect::<Vec<_>>();
        for pixel in row_samples.chunks_exact(channels) {
            let line = pixel[..kept]
                .iter()
                .map(|sample| sample.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{line}")?;
        }
    }
    out.flush()
}
