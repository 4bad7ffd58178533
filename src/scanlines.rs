use log::trace;

use crate::{
    chunks::ihdr::ImageHeader,
    error::FormatError,
    filters::Filter,
    interlacing::{sub_images, SubImage},
};

/// One reduced image (or the whole image) with its filter bytes removed.
#[derive(Debug)]
pub(crate) struct ReducedImage {
    pub(crate) sub_image: SubImage,
    pub(crate) bytes_per_row: usize,
    pub(crate) data: Vec<u8>,
}

type Layout = Vec<(SubImage, usize)>;

/// Reduced images in stream order, each with its packed row size.
fn layout(header: &ImageHeader) -> Result<Layout, FormatError> {
    sub_images(header)
        .into_iter()
        .map(|sub| {
            header
                .bytes_per_row_for(sub.width)
                .map(|bytes_per_row| (sub, bytes_per_row))
                .ok_or(FormatError::ImageTooLarge)
        })
        .collect()
}

fn stream_size(layout: &Layout) -> Result<usize, FormatError> {
    layout
        .iter()
        .try_fold(0usize, |total, (sub, bytes_per_row)| {
            (bytes_per_row + 1)
                .checked_mul(sub.height)
                .and_then(|size| total.checked_add(size))
        })
        .ok_or(FormatError::ImageTooLarge)
}

/// Length of the filtered stream `header` describes, filter bytes included.
pub(crate) fn filtered_size(header: &ImageHeader) -> Result<usize, FormatError> {
    stream_size(&layout(header)?)
}

/// Splits the inflated stream into its reduced images and reverses the
/// per-scanline filters of each. Bytes past the described stream are ignored.
pub(crate) fn unfilter(filtered: &[u8], header: &ImageHeader) -> Result<Vec<ReducedImage>, FormatError> {
    let layout = layout(header)?;
    let expected = stream_size(&layout)?;
    if filtered.len() < expected {
        return Err(FormatError::ImageDataTooShort {
            expected,
            found: filtered.len(),
        });
    }

    let stride = header.stride();
    let mut rest = filtered;
    let mut images = Vec::with_capacity(layout.len());
    for (sub_image, bytes_per_row) in layout {
        trace!(
            "reconstructing {}x{} reduced image, {bytes_per_row} bytes per row",
            sub_image.width,
            sub_image.height
        );
        let (lines, tail) = rest.split_at((bytes_per_row + 1) * sub_image.height);
        rest = tail;
        let mut data = vec![0; bytes_per_row * sub_image.height];
        reconstruct_slice(&mut data, lines, stride, bytes_per_row)?;
        images.push(ReducedImage {
            sub_image,
            bytes_per_row,
            data,
        });
    }
    Ok(images)
}

/// Reverses the filters of consecutive `1 + bytes_per_row` byte scanlines
/// from `src` into `dst`, which holds `bytes_per_row` bytes per row.
pub(crate) fn reconstruct_slice(
    dst: &mut [u8],
    src: &[u8],
    stride: usize,
    bytes_per_row: usize,
) -> Result<(), FormatError> {
    debug_assert_eq!(dst.len() / bytes_per_row, src.len() / (bytes_per_row + 1));
    for (y, line) in src.chunks_exact(bytes_per_row + 1).enumerate() {
        let filter = Filter::try_from(line[0])?;
        let (done, current) = dst.split_at_mut(y * bytes_per_row);
        let current = &mut current[..bytes_per_row];
        let above = y.checked_sub(1).map(|prev| &done[prev * bytes_per_row..]);

        for i in 0..bytes_per_row {
            let a = if i >= stride { current[i - stride] } else { 0 };
            let (b, c) = match above {
                Some(row) if i >= stride => (row[i], row[i - stride]),
                Some(row) => (row[i], 0),
                None => (0, 0),
            };
            current[i] = filter.reconstruct(line[i + 1], a, b, c);
        }
    }
    Ok(())
}
