//! Main entry point for the stowzip CLI application.
//!
//! This binary retrieves local files and HTTP URLs and writes them into a
//! single stored ZIP archive, either on disk or to stdout.

use anyhow::{Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use stowzip::io::write_atomically;
use stowzip::{Bundle, Bundler, Cli, SourceFetcher};

/// Application entry point.
///
/// Parses command-line arguments, builds the archive and writes it out.
/// Interrupting the build with Ctrl-C cancels outstanding downloads and
/// writes nothing.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .format_timestamp(None)
        .init();

    let fetcher = Arc::new(SourceFetcher::new(cli.base.clone())?);
    let request = cli.request();

    let progress = progress_bar(&cli, request.items.len());
    let mut bundler = Bundler::from_arc(fetcher.clone()).with_concurrency(cli.jobs);
    if let Some(bar) = progress.clone() {
        bundler = bundler.with_progress(move |p| bar.set_position(p.done as u64));
    }

    let bundle = tokio::select! {
        result = bundler.build(&request) => result?,
        _ = tokio::signal::ctrl_c() => bail!("Interrupted, no archive written"),
    };
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    write_bundle(&bundle, &cli).await?;

    if !cli.is_quiet() {
        if cli.verbose {
            list_entries(&bundle);
        }
        eprintln!(
            "{}: {} files, {} ({} skipped)",
            bundle.file_name,
            bundle.included.len(),
            format_size(bundle.bytes.len() as u64),
            bundle.skipped.len()
        );
        let transferred = fetcher.transferred_bytes();
        if transferred > 0 {
            eprintln!("Total bytes transferred: {}", format_size(transferred));
        }
    }

    Ok(())
}

/// Progress bar over the number of retrieved items, hidden in quiet mode.
fn progress_bar(cli: &Cli, total: usize) -> Option<ProgressBar> {
    if cli.is_quiet() || total == 0 {
        return None;
    }

    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("Preparing {pos}/{len} {wide_bar}") {
        bar.set_style(style);
    }
    Some(bar)
}

/// Write the archive to stdout or to `<dir>/<suggested name>`.
///
/// An existing file is only replaced with `-o`. The file on disk is swapped in
/// whole, so a failed write never leaves a truncated archive behind.
async fn write_bundle(bundle: &Bundle, cli: &Cli) -> Result<()> {
    if cli.pipe {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&bundle.bytes).await?;
        stdout.flush().await?;
        return Ok(());
    }

    let output_path = match cli.output_dir {
        Some(ref dir) => PathBuf::from(dir).join(&bundle.file_name),
        None => PathBuf::from(&bundle.file_name),
    };

    if output_path.exists() && !cli.overwrite {
        bail!("{} exists (use -o to overwrite)", output_path.display());
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    write_atomically(&output_path, &bundle.bytes).await
}

/// Print included entries in archive order, then the skipped items.
fn list_entries(bundle: &Bundle) {
    for name in &bundle.included {
        eprintln!("  adding: {}", name);
    }
    for skipped in &bundle.skipped {
        eprintln!("skipping: {} ({})", skipped.resource, skipped.reason);
    }
}

/// Format a byte size into a human-readable string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
