// Drafter entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not the terminal — the terminal
//    belongs to the prompt loop)
// 2. Load config
// 3. Load the protocol catalog
// 4. Run the interactive session over stdin/stdout

use std::path::Path;

use anyhow::Context;
use tracing::info;

use protodraft::catalog;
use protodraft::config;
use protodraft::console::{self, SessionEnd};

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("protodraft starting up");

    let config = config::load().context("failed to load configuration")?;

    let catalog_path = Path::new(&config.paths.catalog);
    let records = catalog::load(catalog_path)?;
    info!(
        "loaded {} protocols from {}",
        records.len(),
        catalog_path.display()
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();
    let mut rng = rand::thread_rng();

    match console::run(&mut input, &mut out, records, &config, &mut rng)? {
        SessionEnd::Completed(outcome) => info!(
            "draft complete: {} picks for player 1, {} for player 2",
            outcome.player_one.len(),
            outcome.player_two.len()
        ),
        SessionEnd::Aborted => info!("draft aborted"),
    }

    Ok(())
}

/// Initialize tracing to log to a file, keeping the terminal free for the
/// interactive prompts.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("protodraft.log"))?;

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
