use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use exif_export::export::FormatKind;
use exif_export::{config, export, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-export",
    version,
    about = "EXIF metadata exporter: extract EXIF tags and GPS data from images and save them as TXT, CSV, JSON, XML, or YAML"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Output format: txt, csv, json, xml, yaml (default: from config or --output extension)
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// Output file (single image) or directory (default: next to each image)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Print the metadata to stdout instead of saving it
    #[arg(long)]
    print: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let config = config::Config::load(cli.config.as_deref())?;

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --print
    if cli.print {
        for image_path in &images {
            print_metadata(image_path);
        }
        return Ok(());
    }

    let single_output = single_output(cli.output.as_deref(), images.len())?;
    let format = resolve_format(cli.format.as_deref(), single_output, &config)?;

    let output_dir = match (&cli.output, single_output) {
        (Some(dir), None) => Some(dir.as_path()),
        _ => config.output_dir(),
    };
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    log::info!("Found {} image(s) to export as {format}", images.len());

    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!(
            "[{}/{}] Processing: {}",
            i + 1,
            total,
            image_path.display()
        );

        let destination = match single_output {
            Some(out) => out.to_path_buf(),
            None => pipeline::destination_for(image_path, format, output_dir),
        };

        let result = pipeline::export_image(image_path, format, &destination, &config.export);

        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else {
            if result.no_exif {
                log::warn!("  No EXIF data found in the image.");
            } else {
                log::info!("  Tags: {}", result.tag_count);
            }
            log::info!("  Saved: {}", destination.display());
        }

        results.push(result);
    }

    // JSON output
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.len() - success;
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

/// The single destination file named by `--output`, if it names one.
///
/// `--output` is a directory unless exactly one image is exported; a path with
/// a known export extension is never silently created as a directory.
fn single_output(output: Option<&Path>, image_count: usize) -> Result<Option<&Path>> {
    let Some(out) = output else {
        return Ok(None);
    };
    if out.is_dir() {
        return Ok(None);
    }
    if image_count == 1 {
        return Ok(Some(out));
    }
    if FormatKind::from_path(out).is_some() {
        anyhow::bail!(
            "--output {} looks like a file, but {image_count} images were found. Pass a directory instead.",
            out.display()
        );
    }
    Ok(None)
}

/// `--format` wins, then the `--output` file extension, then the config default.
fn resolve_format(
    flag: Option<&str>,
    output_file: Option<&Path>,
    config: &config::Config,
) -> Result<FormatKind> {
    if let Some(name) = flag {
        return Ok(name.parse()?);
    }
    if let Some(format) = output_file.and_then(FormatKind::from_path) {
        return Ok(format);
    }
    Ok(config.export.default_format)
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print an image's metadata in the text layout.
fn print_metadata(path: &Path) {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let doc = match exif_export::exif::extract(path) {
        Ok(doc) => doc,
        Err(e) => {
            log::error!("  {e}");
            return;
        }
    };

    match export::serialize(&doc, FormatKind::Text) {
        Ok(bytes) => print!("{}", String::from_utf8_lossy(&bytes)),
        Err(e) => log::error!("  {e}"),
    }
}
