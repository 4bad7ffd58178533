use anyhow::Context;
use rawpng::{pnm, DecodeOptions, PNG};

const USAGE: &str = "usage: rpng [-v] [--no-crc] [-o OUT.pnm] FILE";

fn main() -> anyhow::Result<()> {
    let args: Vec<_> = std::env::args().skip(1).collect();
    let verbosity = if args.iter().any(|arg| arg == "-v") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    let options = DecodeOptions::default().with_verify_crc(!args.iter().any(|arg| arg == "--no-crc"));
    let output = args
        .iter()
        .position(|arg| arg == "-o")
        .map(|i| args.get(i + 1).context(USAGE))
        .transpose()?;
    let file_name = args
        .last()
        .filter(|arg| !arg.starts_with('-') && Some(*arg) != output)
        .context(USAGE)?;

    let png = PNG::open_with_options(file_name, options)
        .with_context(|| format!("Failed to decode {file_name}"))?;
    log::info!("{file_name}:\n{}", png.header());
    println!(
        "{file_name}: {}x{}, {} bytes of raster",
        png.header().width,
        png.header().height,
        png.pixels().len()
    );

    if let Some(output) = output {
        let file = std::fs::File::create(output)
            .with_context(|| format!("Failed to create {output}"))?;
        pnm::write_ascii(&png, std::io::BufWriter::new(file))?;
    }
    Ok(())
}
