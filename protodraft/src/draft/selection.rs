// Prompt-input parsing shared by every selection prompt.
//
// The error Display strings double as the console diagnostics; the console
// prefixes them with "Error: ".

use std::collections::HashSet;

use thiserror::Error;

/// The reserved quit token, matched case-insensitively, only as the first
/// token on a line.
pub const QUIT_TOKEN: &str = "q";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No input provided. Please make a selection.")]
    Empty,

    #[error("You must select exactly {expected} protocol(s).")]
    WrongCount { expected: usize },

    #[error("Please enter numbers only.")]
    NotANumber,

    #[error("Duplicate selections are not allowed. Please choose unique protocols.")]
    Duplicate,

    #[error("Please enter numbers between 1 and {max}.")]
    OutOfRange { max: usize },
}

/// Outcome of parsing one selection line.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Zero-based pool indices, pairwise distinct, in input order.
    Indices(Vec<usize>),
    Quit,
}

/// Outcome of the set-selection prompt, where an empty line means "all".
#[derive(Debug, PartialEq, Eq)]
pub enum SetChoice {
    All,
    /// Zero-based menu indices, deduplicated, in first-occurrence order.
    Indices(Vec<usize>),
    Quit,
}

/// Parse a selection line expecting exactly `expected` one-indexed numbers
/// in `[1, max]`. The quit token as the first token wins over everything
/// else on the line.
pub fn parse(input: &str, expected: usize, max: usize) -> Result<Reply, SelectionError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return Err(SelectionError::Empty);
    };
    if first.eq_ignore_ascii_case(QUIT_TOKEN) {
        return Ok(Reply::Quit);
    }
    if tokens.len() != expected {
        return Err(SelectionError::WrongCount { expected });
    }

    let indices = to_indices(&tokens)?;
    let distinct: HashSet<usize> = indices.iter().copied().collect();
    if distinct.len() != indices.len() {
        return Err(SelectionError::Duplicate);
    }
    check_range(&indices, max)?;

    Ok(Reply::Indices(indices))
}

/// Parse the set-selection line: empty means every set, otherwise any
/// number of one-indexed menu numbers. Repeats collapse silently.
pub fn parse_set_choice(input: &str, max: usize) -> Result<SetChoice, SelectionError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let Some(first) = tokens.first() else {
        return Ok(SetChoice::All);
    };
    if first.eq_ignore_ascii_case(QUIT_TOKEN) {
        return Ok(SetChoice::Quit);
    }

    let indices = to_indices(&tokens)?;
    check_range(&indices, max)?;

    let mut seen = HashSet::new();
    let deduped: Vec<usize> = indices.into_iter().filter(|i| seen.insert(*i)).collect();
    Ok(SetChoice::Indices(deduped))
}

/// One-indexed tokens to zero-based indices. The subtraction happens after
/// the parse so "0" fails the range check, not the number parse.
fn to_indices(tokens: &[&str]) -> Result<Vec<usize>, SelectionError> {
    tokens
        .iter()
        .map(|tok| {
            tok.parse::<usize>()
                .map(|n| n.wrapping_sub(1))
                .map_err(|_| SelectionError::NotANumber)
        })
        .collect()
}

fn check_range(indices: &[usize], max: usize) -> Result<(), SelectionError> {
    // zero-based; usize::MAX is "0" after the wrapping subtraction
    if indices.iter().any(|&i| i >= max) {
        return Err(SelectionError::OutOfRange { max });
    }
    Ok(())
}
