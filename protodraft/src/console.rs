// Interactive console loop for a draft session.
//
// All prompt/response plumbing lives here; state transitions live in
// draft::session. Generic over the input and output streams so scripted
// sessions can drive a whole draft in tests. Diagnostics are plain
// sentences prefixed "Error: "; reaching end of input behaves like the
// quit token so piped input that runs dry aborts cleanly.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::catalog::{self, Record};
use crate::config::Config;
use crate::draft::rules::{DraftKind, Turn};
use crate::draft::selection::{self, SetChoice, QUIT_TOKEN};
use crate::draft::session::{DraftError, DraftOutcome, DraftSession, StepOutcome};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// How an interactive session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// Both players completed their selections (already printed).
    Completed(DraftOutcome),
    /// The user entered the quit token at some prompt.
    Aborted,
}

/// Run one full interactive draft session over the given catalog.
pub fn run<I: BufRead, O: Write, R: Rng>(
    input: &mut I,
    out: &mut O,
    records: Vec<Record>,
    config: &Config,
    rng: &mut R,
) -> Result<SessionEnd, ConsoleError> {
    let pool = match choose_pool(input, out, &records, config)? {
        Some(pool) => pool,
        None => return abort(out),
    };
    writeln!(
        out,
        "\n{} protocols available in the selected set(s).",
        pool.len()
    )?;

    let kind = match choose_rules(input, out)? {
        Some(kind) => kind,
        None => return abort(out),
    };
    writeln!(out, "\nDraft Rules: {kind}")?;
    info!("starting {kind} over a pool of {}", pool.len());

    let mut session = match kind {
        DraftKind::Standard => DraftSession::standard(pool)?,
        DraftKind::BlindElimination => {
            DraftSession::blind_elimination(pool, &config.rules, rng)?
        }
    };

    while let Some(turn) = session.current_turn() {
        display_pool(out, &turn, session.pool())?;
        write!(out, "{}", prompt_for(&turn))?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            return abort(out);
        };
        match session.step(&line) {
            Err(e) => writeln!(out, "Error: {e}")?,
            Ok(StepOutcome::Quit) => return abort(out),
            Ok(StepOutcome::Complete) => break,
            Ok(StepOutcome::Continue) => {
                // the hand-off from the elimination prelude to the pick turns
                let entering_picks = matches!(turn, Turn::Eliminate { .. })
                    && matches!(session.current_turn(), Some(Turn::Pick { .. }));
                if entering_picks {
                    writeln!(out, "\nContinuing with Standard Draft rules...")?;
                }
            }
        }
    }

    let outcome = session.into_outcome();
    print_outcome(out, &outcome)?;
    Ok(SessionEnd::Completed(outcome))
}

// ---------------------------------------------------------------------------
// Pool setup
// ---------------------------------------------------------------------------

/// The set-selection loop. Returns the pool, or `None` on quit/EOF. Keeps
/// prompting until the chosen sets yield a large enough pool.
fn choose_pool<I: BufRead, O: Write>(
    input: &mut I,
    out: &mut O,
    records: &[Record],
    config: &Config,
) -> Result<Option<Vec<Record>>, ConsoleError> {
    let sets = catalog::set_index(records);
    let min_pool = config.rules.min_pool();

    loop {
        writeln!(out, "\nAvailable sets:")?;
        for (i, (name, count)) in sets.iter().enumerate() {
            writeln!(out, "{}. {} ({})", i + 1, name, count)?;
        }
        writeln!(out, "Press Enter to use all sets or Q to quit.")?;
        write!(
            out,
            "Enter the numbers of the sets to use (separated by spaces): "
        )?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let chosen: HashSet<String> = match selection::parse_set_choice(&line, sets.len()) {
            Err(e) => {
                writeln!(out, "Error: {e}")?;
                continue;
            }
            Ok(SetChoice::Quit) => return Ok(None),
            Ok(SetChoice::All) => sets.iter().map(|(name, _)| name.clone()).collect(),
            Ok(SetChoice::Indices(indices)) => {
                indices.into_iter().map(|i| sets[i].0.clone()).collect()
            }
        };

        let pool = catalog::filter_by_sets(records, &chosen);
        if pool.len() < min_pool {
            writeln!(
                out,
                "Error: The selected sets must contain at least {} protocols. \
                 Only {} protocols are available.",
                min_pool,
                pool.len()
            )?;
            continue;
        }
        return Ok(Some(pool));
    }
}

/// The draft-rules menu. Returns the chosen procedure, or `None` on
/// quit/EOF.
fn choose_rules<I: BufRead, O: Write>(
    input: &mut I,
    out: &mut O,
) -> Result<Option<DraftKind>, ConsoleError> {
    writeln!(out, "\nChoose draft rules:")?;
    writeln!(out, "1. Standard Draft")?;
    writeln!(out, "2. Blind Elimination Draft")?;

    loop {
        write!(out, "Enter the number of your choice (1 or 2) or Q to quit: ")?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        if line.eq_ignore_ascii_case(QUIT_TOKEN) {
            return Ok(None);
        }
        match line.parse::<u32>() {
            Ok(1) => return Ok(Some(DraftKind::Standard)),
            Ok(2) => return Ok(Some(DraftKind::BlindElimination)),
            Ok(_) => writeln!(out, "Error: Please enter 1 or 2.")?,
            Err(_) => writeln!(out, "Error: Please enter a number.")?,
        }
    }
}

// ---------------------------------------------------------------------------
// Turn display
// ---------------------------------------------------------------------------

fn display_pool<O: Write>(out: &mut O, turn: &Turn, pool: &[Record]) -> std::io::Result<()> {
    let header = match turn {
        Turn::Pick { player, .. } => format!("{player}'s turn"),
        Turn::Eliminate { player } => format!("{player}'s turn to eliminate"),
    };
    writeln!(out, "\n{header}:")?;
    for (i, record) in pool.iter().enumerate() {
        writeln!(out, "{}. {record}", i + 1)?;
    }
    Ok(())
}

fn prompt_for(turn: &Turn) -> String {
    match turn {
        Turn::Pick { player, count: 1 } => {
            format!("{player}, choose a protocol (by number) or Q to quit: ")
        }
        Turn::Pick { player, count } => format!(
            "{player}, choose {count} protocols (by numbers, separated by spaces) or Q to quit: "
        ),
        Turn::Eliminate { player } => {
            format!("{player}, choose a protocol to eliminate (by number) or Q to quit: ")
        }
    }
}

fn print_outcome<O: Write>(out: &mut O, outcome: &DraftOutcome) -> std::io::Result<()> {
    writeln!(out, "\nDraft complete!")?;
    writeln!(out, "\nPlayer 1 Protocols:")?;
    for record in &outcome.player_one {
        writeln!(out, "- {} ({})", record.protocol, record.set)?;
    }
    writeln!(out, "\nPlayer 2 Protocols:")?;
    for record in &outcome.player_two {
        writeln!(out, "- {} ({})", record.protocol, record.set)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

fn abort<O: Write>(out: &mut O) -> Result<SessionEnd, ConsoleError> {
    writeln!(out, "\nDraft Aborted.")?;
    info!("draft aborted at user request");
    Ok(SessionEnd::Aborted)
}

/// One trimmed line of input, or `None` at end of input.
fn read_line<I: BufRead>(input: &mut I) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
