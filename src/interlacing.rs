//! Adam7 pass geometry and the scatter of reduced images into the raster.

use std::{iter::StepBy, ops::Range};

use log::trace;

use crate::{
    chunks::ihdr::ImageHeader, error::FormatError, scanlines::ReducedImage, utils::copy_bits,
    utils::div_ceil,
};

/// Sampling grid of a reduced image relative to the full raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    pub offset_x: usize,
    pub period_x: usize,
    pub offset_y: usize,
    pub period_y: usize,
}

const fn pass(offset_x: usize, period_x: usize, offset_y: usize, period_y: usize) -> Pass {
    Pass {
        offset_x,
        period_x,
        offset_y,
        period_y,
    }
}

/// Pass 0 is the whole image and is only used without interlacing.
pub static PASSES: [Pass; 8] = [
    pass(0, 1, 0, 1),
    pass(0, 8, 0, 8),
    pass(4, 8, 0, 8),
    pass(0, 4, 4, 8),
    pass(2, 4, 0, 4),
    pass(0, 2, 2, 4),
    pass(1, 2, 0, 2),
    pass(0, 1, 1, 2),
];

impl Pass {
    /// Number of grid positions in `0..length`.
    pub const fn count(length: usize, offset: usize, period: usize) -> usize {
        div_ceil(length.saturating_sub(offset), period)
    }

    pub const fn reduced_size(&self, width: usize, height: usize) -> (usize, usize) {
        (
            Self::count(width, self.offset_x, self.period_x),
            Self::count(height, self.offset_y, self.period_y),
        )
    }

    /// Full raster coordinates of this pass's samples, row by row.
    pub(crate) fn grid(&self, width: usize, height: usize) -> GridIter {
        GridIter::new(
            (self.offset_y..height).step_by(self.period_y),
            (self.offset_x..width).step_by(self.period_x),
        )
    }
}

/// A non-empty reduced image: which pass, and how many pixels it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubImage {
    pub(crate) pass: Pass,
    pub(crate) width: usize,
    pub(crate) height: usize,
}

/// The reduced images making up an image, in stream order.
pub(crate) fn sub_images(header: &ImageHeader) -> Vec<SubImage> {
    let (width, height) = (header.width as usize, header.height as usize);
    if header.interlace {
        Adam7Iter::new(width, height).collect()
    } else {
        vec![SubImage {
            pass: PASSES[0],
            width,
            height,
        }]
    }
}

/// Walks passes 1 to 7, skipping the ones without pixels.
pub(crate) struct Adam7Iter {
    current_pass: Option<usize>,
    width: usize,
    height: usize,
}

impl Adam7Iter {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            current_pass: Some(1),
            width,
            height,
        }
    }
}

impl Iterator for Adam7Iter {
    type Item = SubImage;

    fn next(&mut self) -> Option<Self::Item> {
        let mut index = self.current_pass?;
        while index < PASSES.len() {
            let pass = PASSES[index];
            let (width, height) = pass.reduced_size(self.width, self.height);
            index += 1;
            // If either is zero, the sub image has no pixels and we can go to the next one.
            if width == 0 || height == 0 {
                continue;
            }
            self.current_pass = Some(index);
            return Some(SubImage {
                pass,
                width,
                height,
            });
        }
        self.current_pass = None;
        None
    }
}

#[derive(Debug)]
pub(crate) struct GridIter {
    rows: StepBy<Range<usize>>,
    current_row: Option<usize>,
    orig_columns: StepBy<Range<usize>>,
    columns: StepBy<Range<usize>>,
}

impl GridIter {
    fn new(mut rows: StepBy<Range<usize>>, columns: StepBy<Range<usize>>) -> Self {
        let current_row = rows.next();
        Self {
            rows,
            current_row,
            orig_columns: columns.clone(),
            columns,
        }
    }
}

impl Iterator for GridIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let y = self.current_row?;
        if let Some(x) = self.columns.next() {
            return Some((x, y));
        }
        self.current_row = self.rows.next();
        self.columns = self.orig_columns.clone();
        Some((self.columns.next()?, self.current_row?))
    }
}

/// Scatters the reconstructed reduced images into one raster of
/// `height * bytes_per_row` bytes.
pub(crate) fn deinterlace(
    images: &[ReducedImage],
    header: &ImageHeader,
) -> Result<Vec<u8>, FormatError> {
    let bytes_per_row = header.bytes_per_row().ok_or(FormatError::ImageTooLarge)?;
    let size = header.raster_size().ok_or(FormatError::ImageTooLarge)?;
    let mut raster = vec![0; size];

    for image in images {
        trace!(
            "placing {}x{} pass at ({}, {}) every ({}, {})",
            image.sub_image.width,
            image.sub_image.height,
            image.sub_image.pass.offset_x,
            image.sub_image.pass.offset_y,
            image.sub_image.pass.period_x,
            image.sub_image.pass.period_y,
        );
        if header.bits_per_pixel() >= 8 {
            place_aligned(&mut raster, bytes_per_row, image, header);
        } else {
            place_unaligned(&mut raster, bytes_per_row, image, header);
        }
    }
    Ok(raster)
}

fn place_aligned(raster: &mut [u8], bytes_per_row: usize, image: &ReducedImage, header: &ImageHeader) {
    let stride = header.stride();
    let grid = image
        .sub_image
        .pass
        .grid(header.width as usize, header.height as usize);
    for ((x, y), sample) in grid.zip(image.data.chunks_exact(stride)) {
        let start = y * bytes_per_row + x * stride;
        raster[start..start + stride].copy_from_slice(sample);
    }
}

/// Several passes share each destination byte here, so every sample is
/// merged into its own bit field only.
fn place_unaligned(
    raster: &mut [u8],
    bytes_per_row: usize,
    image: &ReducedImage,
    header: &ImageHeader,
) {
    let bits = header.bit_depth as usize;
    let pass = image.sub_image.pass;
    for (x, y) in pass.grid(header.width as usize, header.height as usize) {
        let row = (y - pass.offset_y) / pass.period_y;
        let column = (x - pass.offset_x) / pass.period_x;
        let src_bit = column * bits;
        let dst_bit = x * bits;
        copy_bits(
            &mut raster[y * bytes_per_row + dst_bit / 8],
            image.data[row * image.bytes_per_row + src_bit / 8],
            (dst_bit % 8) as u32,
            (src_bit % 8) as u32,
            bits as u32,
        );
    }
}
