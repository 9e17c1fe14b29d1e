// Players, turns, and the two draft procedure schedules.

use std::fmt;

/// Which side of the table is acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "Player 1"),
            Player::Two => write!(f, "Player 2"),
        }
    }
}

/// One step of a draft procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The player removes `count` records from the pool into their selection.
    Pick { player: Player, count: usize },
    /// The player removes one record from the pool; it is discarded.
    Eliminate { player: Player },
}

impl Turn {
    /// How many records this turn removes from the pool.
    pub fn demand(&self) -> usize {
        match self {
            Turn::Pick { count, .. } => *count,
            Turn::Eliminate { .. } => 1,
        }
    }

    pub fn player(&self) -> Player {
        match self {
            Turn::Pick { player, .. } => *player,
            Turn::Eliminate { player } => *player,
        }
    }
}

/// The two supported draft procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    Standard,
    BlindElimination,
}

impl fmt::Display for DraftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftKind::Standard => write!(f, "Standard Draft"),
            DraftKind::BlindElimination => write!(f, "Blind Elimination Draft"),
        }
    }
}

/// The fixed Standard Draft turn sequence: 1-2-2-1.
pub fn standard_schedule() -> Vec<Turn> {
    vec![
        Turn::Pick {
            player: Player::One,
            count: 1,
        },
        Turn::Pick {
            player: Player::Two,
            count: 2,
        },
        Turn::Pick {
            player: Player::One,
            count: 2,
        },
        Turn::Pick {
            player: Player::Two,
            count: 1,
        },
    ]
}

/// Alternating eliminations, Player 1 first, `per_player` rounds.
pub fn elimination_schedule(per_player: usize) -> Vec<Turn> {
    let mut schedule = Vec::with_capacity(per_player * 2);
    for _ in 0..per_player {
        schedule.push(Turn::Eliminate {
            player: Player::One,
        });
        schedule.push(Turn::Eliminate {
            player: Player::Two,
        });
    }
    schedule
}

/// Total records the standard schedule removes into selections.
pub fn standard_pick_total() -> usize {
    standard_schedule().iter().map(Turn::demand).sum()
}
