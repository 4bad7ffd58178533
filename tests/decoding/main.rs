
use std::{fs, path::Path};

use miniz_oxide::deflate::compress_to_vec_zlib;
use rawpng::{
    ChunkField, ColourMode, DecodeError, DecodeOptions, DecompressionError, FormatError, PNGDecoder, PNG,
};
use support::{chunk, decode_reference, file, ihdr, Image};

fn iend() -> Vec<u8> {
    chunk(b"IEND", &[])
}

fn idat(filtered: &[u8]) -> Vec<u8> {
    chunk(b"IDAT", &compress_to_vec_zlib(filtered, 6))
}

#[test]
fn decodes_single_grey_pixel() {
    let bytes = file(&[ihdr(1, 1, 8, 0, false), idat(&[0, 0x7f]), iend()]);
    let png = PNG::decode(&bytes).unwrap();
    assert_eq!(png.header().colour_mode, ColourMode::Greyscale);
    assert_eq!(png.pixels(), [0x7f]);
    assert_eq!(rawpng::decode(&bytes).unwrap(), [0x7f]);
}

#[test]
fn staged_decoder_matches_one_shot() {
    let image = Image::noise(7, 5, 8, 2, false, 3);
    let bytes = image.encode(1);
    let (decoder, header) = PNGDecoder::new(&bytes).unwrap().read_header().unwrap();
    assert_eq!((header.width, header.height), (7, 5));
    assert_eq!(header.bytes_per_row(), Some(21));
    assert_eq!(decoder.decode(header).unwrap().into_pixels(), image.raster);
}

#[test]
fn matches_reference_decoder() {
    let formats: &[(u8, &[u8])] = &[
        (0, &[1, 2, 4, 8, 16]),
        (2, &[8, 16]),
        (3, &[1, 2, 4, 8]),
        (4, &[8, 16]),
        (6, &[8, 16]),
    ];
    let sizes = [(1, 1), (5, 3), (13, 9), (33, 17), (2, 40)];
    let mut seed = 0;
    for &(colour, depths) in formats {
        for &bit_depth in depths {
            for &(width, height) in &sizes {
                for interlace in [false, true] {
                    seed += 1;
                    let image = Image::noise(width, height, bit_depth, colour, interlace, seed);
                    let bytes = image.encode(3);
                    let decoded = rawpng::decode(&bytes).unwrap_or_else(|err| {
                        panic!("{width}x{height} colour {colour} depth {bit_depth} interlace {interlace}: {err}")
                    });
                    assert_eq!(
                        decoded, image.raster,
                        "{width}x{height} colour {colour} depth {bit_depth} interlace {interlace}"
                    );
                    assert_eq!(decoded, decode_reference(&bytes));
                }
            }
        }
    }
}

#[test]
fn sub_byte_rows_are_rounded_up() {
    // 5 pixels of 1 bit fit in a single byte per row
    let image = Image::noise(5, 4, 1, 0, false, 11);
    let png = PNG::decode(&image.encode(1)).unwrap();
    assert_eq!(png.header().bytes_per_row(), Some(1));
    assert_eq!(png.pixels().len(), 4);
}

#[test]
fn ancillary_chunk_between_image_data() {
    let image = Image::noise(9, 9, 8, 6, false, 5);
    let compressed = compress_to_vec_zlib(&image.filtered(), 6);
    let (first, second) = compressed.split_at(compressed.len() / 2);
    let bytes = file(&[
        ihdr(9, 9, 8, 6, false),
        chunk(b"IDAT", first),
        chunk(b"tEXt", b"Comment\0between image data"),
        chunk(b"IDAT", second),
        iend(),
    ]);
    assert_eq!(rawpng::decode(&bytes).unwrap(), image.raster);
}

#[test]
fn unknown_critical_chunk_aborts() {
    let bytes = file(&[ihdr(1, 1, 8, 0, false), chunk(b"ABCD", &[1, 2]), idat(&[0, 0]), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::UnknownCriticalChunk(t))) if &t.0 == b"ABCD"
    ));
}

#[test]
fn invalid_header_fails_before_walking_chunks() {
    let bytes = file(&[ihdr(0, 1, 8, 0, false), chunk(b"ABCD", &[]), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::ZeroDimension))
    ));

    let bytes = file(&[ihdr(1, 1, 3, 2, false), idat(&[0, 0, 0, 0]), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::InvalidBitDepth {
            colour_mode: ColourMode::Truecolour,
            bit_depth: 3
        }))
    ));
}

#[test]
fn first_chunk_has_to_be_header() {
    let bytes = file(&[idat(&[0, 0]), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::FirstChunkNotHeader(_)))
    ));
    assert!(matches!(
        PNG::decode(&file(&[])),
        Err(DecodeError::Format(FormatError::MissingHeader))
    ));
}

#[test]
fn rejects_bad_signature() {
    let mut bytes = file(&[ihdr(1, 1, 8, 0, false), idat(&[0, 0]), iend()]);
    bytes[1] = b'p';
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::BadMagic))
    ));
}

#[test]
fn truncated_file() {
    let bytes = file(&[ihdr(1, 1, 8, 0, false), idat(&[0, 0]), iend()]);
    // cut inside the IDAT payload
    let cut = 8 + 25 + 8 + 3;
    assert!(matches!(
        PNG::decode(&bytes[..cut]),
        Err(DecodeError::Format(FormatError::Truncated(ChunkField::Data)))
    ));
    // cut inside the IEND crc
    assert!(matches!(
        PNG::decode(&bytes[..bytes.len() - 1]),
        Err(DecodeError::Format(FormatError::Truncated(ChunkField::Crc)))
    ));
}

#[test]
fn truncated_compressed_stream() {
    let image = Image::noise(16, 16, 8, 0, false, 9);
    let compressed = compress_to_vec_zlib(&image.filtered(), 6);
    let bytes = file(&[
        ihdr(16, 16, 8, 0, false),
        chunk(b"IDAT", &compressed[..compressed.len() / 2]),
        iend(),
    ]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Decompression(DecompressionError::Truncated))
    ));
}

#[test]
fn crc_mismatch_unless_disabled() {
    let mut bytes = file(&[ihdr(1, 1, 8, 0, false), idat(&[0, 0x42]), iend()]);
    // last byte of the IDAT crc
    let index = bytes.len() - 12 - 1;
    bytes[index] ^= 0xff;
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::CrcMismatch { chunk_type, .. })) if &chunk_type.0 == b"IDAT"
    ));

    let options = DecodeOptions::default().with_verify_crc(false);
    assert_eq!(PNG::decode_with_options(&bytes, options).unwrap().pixels(), [0x42]);
}

#[test]
fn size_hint_is_bounded_by_the_header() {
    let bytes = file(&[ihdr(1, 1, 8, 0, false), idat(&[0, 0x42]), iend()]);
    for hint in [usize::MAX / 2, usize::MAX] {
        let options = DecodeOptions::default().with_inflate_size_hint(hint);
        assert_eq!(PNG::decode_with_options(&bytes, options).unwrap().pixels(), [0x42]);
    }
}

#[test]
fn image_data_inflating_past_the_header_size() {
    // a 1x1 image needs two filtered bytes
    let bytes = file(&[ihdr(1, 1, 8, 0, false), idat(&[0; 1 << 16]), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Decompression(DecompressionError::Corrupt(_)))
    ));

    let image = Image::noise(4, 4, 8, 2, true, 13);
    let mut filtered = image.filtered();
    filtered.push(0);
    let bytes = file(&[ihdr(4, 4, 8, 2, true), idat(&filtered), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Decompression(DecompressionError::Corrupt(_)))
    ));
}

#[test]
fn oversized_dimensions() {
    for interlace in [false, true] {
        let bytes = file(&[ihdr(u32::MAX, u32::MAX, 16, 6, interlace), idat(&[0, 0]), iend()]);
        assert!(matches!(
            PNG::decode(&bytes),
            Err(DecodeError::Format(FormatError::ImageTooLarge))
        ));
    }
}

#[test]
fn missing_image_data() {
    let bytes = file(&[ihdr(1, 1, 8, 0, false), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::MissingImageData))
    ));
}

#[test]
fn bad_scanlines() {
    let bytes = file(&[ihdr(2, 2, 8, 0, false), idat(&[0, 1, 2, 7, 3, 4]), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::InvalidFilterType(7)))
    ));

    let bytes = file(&[ihdr(2, 2, 8, 0, false), idat(&[0, 1, 2, 0]), iend()]);
    assert!(matches!(
        PNG::decode(&bytes),
        Err(DecodeError::Format(FormatError::ImageDataTooShort { expected: 6, found: 4 }))
    ));
}

#[test]
fn palette_is_passed_through() {
    let image = Image::noise(4, 4, 2, 3, true, 21);
    let png = PNG::decode(&image.encode(1)).unwrap();
    assert_eq!(png.palette().map(<[u8]>::len), Some(12));
    assert_eq!(png.pixels(), image.raster);
}

#[test]
fn decodes_from_disk() {
    let image = Image::noise(6, 6, 16, 4, true, 17);
    let path = std::env::temp_dir().join(format!("rawpng-{}.png", std::process::id()));
    fs::write(&path, image.encode(2)).unwrap();
    let decoded = rawpng::decode_file(&path);
    fs::remove_file(&path).unwrap();
    assert_eq!(decoded.unwrap(), image.raster);

    assert!(matches!(
        rawpng::decode_file(Path::new("/nonexistent/rawpng.png")),
        Err(DecodeError::Io(_))
    ));
}

/// Walks a checkout of PngSuite, if one was placed next to this file.
/// Files starting with `x` are deliberately broken and have to be rejected.
#[test]
fn png_suite() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/png-suite");
    let Ok(entries) = fs::read_dir(&dir) else {
        eprintln!("{} not found, skipping", dir.display());
        return;
    };
    let mut paths = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "png"))
        .collect::<Vec<_>>();
    paths.sort();

    for path in paths {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let decoded = rawpng::decode_file(&path);
        if name.starts_with('x') {
            assert!(
                matches!(decoded, Err(DecodeError::Format(_))),
                "{name} should fail with a format error, got {decoded:?}"
            );
        } else {
            let bytes = fs::read(&path).unwrap();
            let decoded = decoded.unwrap_or_else(|err| panic!("{name}: {err}"));
            assert_eq!(decoded, decode_reference(&bytes), "{name}");
        }
    }
}
