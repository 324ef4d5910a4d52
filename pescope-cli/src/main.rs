mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

/// pescope - Windows PE executable inspection
#[derive(Debug, Parser)]
#[command(name = "pescope", version, about, long_about = None)]
struct Cli {
    /// Path to the PE file to inspect.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Emit output as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    verbose: bool,

    /// Hex-dump the leading bytes of the named section (e.g. ".text").
    #[arg(long, value_name = "NAME")]
    section: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log to stderr unless --json; --verbose enables debug; RUST_LOG overrides.
    if !cli.json {
        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    let data = std::fs::read(&cli.file)
        .with_context(|| format!("failed to read file: {}", cli.file.display()))?;
    log::debug!("read {} bytes from {}", data.len(), cli.file.display());

    let image = pescope::PeImage::from_bytes(&data)
        .with_context(|| format!("failed to decode PE file: {}", cli.file.display()))?;
    log::debug!(
        "decoded {:?} image: {} sections, {} imported modules",
        image.format(),
        image.sections.len(),
        image.imported_modules.len()
    );

    if let Some(name) = &cli.section {
        return output::dump_section(&image, &data, name);
    }

    if cli.json {
        output::print_json(&cli.file, &image)
    } else {
        output::print_pretty(&cli.file, &image);
        Ok(())
    }
}
