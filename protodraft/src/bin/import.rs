// Converter entry point: spreadsheet CSV export → JSON catalog.
//
// Usage: protodraft-import [input.csv] [output.json]
// Omitted arguments fall back to the [paths] section of the config file,
// which itself defaults to the conventional file names in the working
// directory. All diagnostics go to stdout.

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use protodraft::{config, import};

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = config::load().context("failed to load configuration")?;
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.paths.import_csv));
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.paths.catalog));
    info!("importing {} into {}", input.display(), output.display());

    let summary = import::run(&input, &output)?;

    println!("CSV Header: {}", summary.headers.join(", "));
    for line in &summary.skipped_rows {
        println!("Skipping row {line}: missing '{}' value.", import::KEY_COLUMN);
    }
    if summary.created {
        println!(
            "'{}' does not exist. Creating a new file.",
            output.display()
        );
    } else if summary.appended > 0 {
        println!("Found {} new entries to append.", summary.appended);
    } else {
        println!("No new entries found.");
    }
    println!(
        "Data has been successfully written to '{}' in alphabetical order ({} records).",
        output.display(),
        summary.total
    );

    Ok(())
}

/// Same file-logging setup as the drafter; the importer shares its log.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("protodraft-import.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("protodraft=info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
