use anyhow::Context;
use rawpng::{DecodeError, PNG};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Error)
        .init();
    let suite_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/png-suite"));

    let mut test_images = fs::read_dir(&suite_dir)
        .with_context(|| format!("Failed to read {}", suite_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension() == Some(OsStr::new("png")))
        .collect::<Vec<_>>();
    test_images.sort();

    let mut results = Vec::with_capacity(test_images.len());
    let mut mismatches = 0;
    for image_path in &test_images {
        let name = file_stem(image_path)?;
        let expect_failure = name.starts_with('x');
        let bytes = fs::read(image_path)
            .with_context(|| format!("Failed to read {}", image_path.display()))?;

        let start = Instant::now();
        let outcome = PNG::decode(&bytes);
        let micros = start.elapsed().as_micros() as u64;

        let (status, detail) = match &outcome {
            Ok(png) => ("decoded", format!("{} bytes", png.pixels().len())),
            Err(err @ DecodeError::Format(_)) => ("format-error", err.to_string()),
            Err(err) => ("error", err.to_string()),
        };
        let as_expected = match &outcome {
            Ok(_) => !expect_failure,
            Err(DecodeError::Format(_)) => expect_failure,
            Err(_) => false,
        };
        if !as_expected {
            mismatches += 1;
            log::error!("{name}: unexpected outcome, {status} ({detail})");
        }
        results.push(serde_json::json!({
            "name": name,
            "expect_failure": expect_failure,
            "status": status,
            "detail": detail,
            "as_expected": as_expected,
            "micros": micros,
        }));
    }

    let now = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)?;
    let report = serde_json::json!({
        "date": now,
        "suite": suite_dir.display().to_string(),
        "images": results,
        "mismatches": mismatches,
    });
    fs::write("decode_report.json", serde_json::to_string_pretty(&report)?)?;
    println!(
        "{} images, {} unexpected outcomes, report written to decode_report.json",
        test_images.len(),
        mismatches
    );
    Ok(())
}

fn file_stem(path: &Path) -> anyhow::Result<&str> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("Non UTF-8 file name {}", path.display()))
}
