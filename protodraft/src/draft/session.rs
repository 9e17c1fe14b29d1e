// Draft session state machine.
//
// A session owns the pool and both selections and walks a fixed turn
// schedule. Each prompt line goes through `step`, which validates, mutates,
// and reports whether the schedule continues, completed, or was quit. The
// console loop stays a thin adapter around it.

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Record;
use crate::config::RulesConfig;

use super::rules::{self, Player, Turn};
use super::selection::{self, Reply, SelectionError};

// ---------------------------------------------------------------------------
// Error / outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("the pool has {available} records but the schedule needs {needed}")]
    PoolExhausted { available: usize, needed: usize },
}

/// Result of feeding one prompt line to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The turn was applied; more turns remain.
    Continue,
    /// The turn was applied and the schedule is complete.
    Complete,
    /// The user entered the quit token.
    Quit,
}

/// Final selections of a draft.
#[derive(Debug)]
pub struct DraftOutcome {
    pub player_one: Vec<Record>,
    pub player_two: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct DraftSession {
    pool: Vec<Record>,
    player_one: Vec<Record>,
    player_two: Vec<Record>,
    schedule: Vec<Turn>,
    cursor: usize,
}

impl DraftSession {
    /// A Standard Draft over the given pool.
    pub fn standard(pool: Vec<Record>) -> Result<Self, DraftError> {
        Self::with_schedule(pool, rules::standard_schedule())
    }

    /// A Blind Elimination Draft: the random culling phase runs here,
    /// immediately; the interactive eliminations and the standard turns
    /// become the schedule.
    pub fn blind_elimination<R: Rng>(
        mut pool: Vec<Record>,
        rules_config: &RulesConfig,
        rng: &mut R,
    ) -> Result<Self, DraftError> {
        while pool.len() > rules_config.cull_target {
            let culled = pool.remove(rng.gen_range(0..pool.len()));
            debug!("culled '{}' from the pool", culled.protocol);
        }

        let mut schedule = rules::elimination_schedule(rules_config.eliminations_per_player);
        schedule.extend(rules::standard_schedule());
        Self::with_schedule(pool, schedule)
    }

    /// Checks up front that the pool covers every scheduled removal, so the
    /// turn loop can never run the pool dry.
    fn with_schedule(pool: Vec<Record>, schedule: Vec<Turn>) -> Result<Self, DraftError> {
        let needed: usize = schedule.iter().map(Turn::demand).sum();
        if pool.len() < needed {
            return Err(DraftError::PoolExhausted {
                available: pool.len(),
                needed,
            });
        }
        Ok(DraftSession {
            pool,
            player_one: Vec::new(),
            player_two: Vec::new(),
            schedule,
            cursor: 0,
        })
    }

    /// The pool in display order. Prompt indices are interpreted against
    /// exactly this slice.
    pub fn pool(&self) -> &[Record] {
        &self.pool
    }

    /// The turn awaiting input, or `None` once the schedule is complete.
    pub fn current_turn(&self) -> Option<Turn> {
        self.schedule.get(self.cursor).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.schedule.len()
    }

    /// Feed one raw prompt line to the state machine. On a validation error
    /// the state is untouched and the same turn expects input again.
    pub fn step(&mut self, input: &str) -> Result<StepOutcome, SelectionError> {
        let Some(turn) = self.current_turn() else {
            return Ok(StepOutcome::Complete);
        };

        let reply = selection::parse(input, turn.demand(), self.pool.len())?;
        let mut indices = match reply {
            Reply::Quit => return Ok(StepOutcome::Quit),
            Reply::Indices(indices) => indices,
        };

        // Indices refer to the pool as displayed; removing highest-first
        // keeps the remaining ones valid as the pool shrinks.
        indices.sort_unstable_by(|a, b| b.cmp(a));
        for index in indices {
            let record = self.pool.remove(index);
            match turn {
                Turn::Pick { player, .. } => {
                    debug!("{player} picked '{}'", record.protocol);
                    self.selection_mut(player).push(record);
                }
                Turn::Eliminate { player } => {
                    debug!("{player} eliminated '{}'", record.protocol);
                }
            }
        }

        self.cursor += 1;
        Ok(if self.is_complete() {
            StepOutcome::Complete
        } else {
            StepOutcome::Continue
        })
    }

    fn selection_mut(&mut self, player: Player) -> &mut Vec<Record> {
        match player {
            Player::One => &mut self.player_one,
            Player::Two => &mut self.player_two,
        }
    }

    /// Both players' selections. Meaningful once `is_complete()`.
    pub fn into_outcome(self) -> DraftOutcome {
        DraftOutcome {
            player_one: self.player_one,
            player_two: self.player_two,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn record(protocol: &str) -> Record {
        Record {
            protocol: protocol.to_string(),
            set: "Core".to_string(),
            top: String::new(),
            bottom: String::new(),
            extra: Default::default(),
        }
    }

    fn pool_of(n: usize) -> Vec<Record> {
        (0..n).map(|i| record(&format!("P{i:02}"))).collect()
    }

    fn names(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.protocol.clone()).collect()
    }

    /// Drive a full draft with always-first-index picks.
    fn run_with_first_index_picks(mut session: DraftSession) -> DraftOutcome {
        while let Some(turn) = session.current_turn() {
            let input = match turn.demand() {
                1 => "1".to_string(),
                n => (1..=n).map(|i| i.to_string()).collect::<Vec<_>>().join(" "),
            };
            session.step(&input).unwrap();
        }
        session.into_outcome()
    }

    #[test]
    fn standard_draft_yields_three_picks_each() {
        let session = DraftSession::standard(pool_of(9)).unwrap();
        let outcome = run_with_first_index_picks(session);
        assert_eq!(outcome.player_one.len(), 3);
        assert_eq!(outcome.player_two.len(), 3);
    }

    #[test]
    fn selections_are_disjoint_from_each_other_and_the_pool() {
        let mut session = DraftSession::standard(pool_of(10)).unwrap();
        while !session.is_complete() {
            let turn = session.current_turn().unwrap();
            let input = match turn.demand() {
                1 => "2".to_string(),
                _ => "2 4".to_string(),
            };
            session.step(&input).unwrap();
        }

        let leftover: HashSet<String> = names(session.pool()).into_iter().collect();
        let outcome = session.into_outcome();
        let p1: HashSet<String> = names(&outcome.player_one).into_iter().collect();
        let p2: HashSet<String> = names(&outcome.player_two).into_iter().collect();

        assert_eq!(p1.len(), 3);
        assert_eq!(p2.len(), 3);
        assert!(p1.is_disjoint(&p2));
        assert!(p1.is_disjoint(&leftover));
        assert!(p2.is_disjoint(&leftover));
        assert_eq!(leftover.len(), 4);
    }

    #[test]
    fn multi_pick_token_order_does_not_matter() {
        let pool = pool_of(5);

        let mut forward = DraftSession::standard(pool.clone()).unwrap();
        forward.step("5").unwrap(); // P1 takes the last so both pools align
        forward.step("1 3").unwrap();

        let mut reversed = DraftSession::standard(pool).unwrap();
        reversed.step("5").unwrap();
        reversed.step("3 1").unwrap();

        let f: HashSet<String> = names(&forward.player_two).into_iter().collect();
        let r: HashSet<String> = names(&reversed.player_two).into_iter().collect();
        assert_eq!(f, r);
        assert_eq!(names(forward.pool()), names(reversed.pool()));
    }

    #[test]
    fn multi_pick_removes_displayed_indices() {
        let mut session = DraftSession::standard(pool_of(6)).unwrap();
        session.step("6").unwrap(); // P1: take P05
        session.step("3 1").unwrap(); // P2: displayed 1st and 3rd = P00, P02

        let picked: HashSet<String> = names(&session.player_two).into_iter().collect();
        assert_eq!(
            picked,
            ["P00".to_string(), "P02".to_string()].into_iter().collect()
        );
        assert_eq!(names(session.pool()), vec!["P01", "P03", "P04"]);
    }

    #[test]
    fn validation_error_leaves_state_untouched() {
        let mut session = DraftSession::standard(pool_of(9)).unwrap();
        let before = names(session.pool());

        assert_eq!(
            session.step("1 2"),
            Err(SelectionError::WrongCount { expected: 1 })
        );
        assert_eq!(session.step("99"), Err(SelectionError::OutOfRange { max: 9 }));
        assert_eq!(session.step("x"), Err(SelectionError::NotANumber));

        assert_eq!(names(session.pool()), before);
        assert_eq!(session.current_turn(), Some(rules::standard_schedule()[0]));
    }

    #[test]
    fn quit_token_reports_quit_without_mutating() {
        let mut session = DraftSession::standard(pool_of(9)).unwrap();
        assert_eq!(session.step("q"), Ok(StepOutcome::Quit));
        assert_eq!(session.pool().len(), 9);
        assert!(!session.is_complete());
    }

    #[test]
    fn pool_smaller_than_schedule_is_rejected() {
        let err = DraftSession::standard(pool_of(5)).unwrap_err();
        match err {
            DraftError::PoolExhausted { available, needed } => {
                assert_eq!(available, 5);
                assert_eq!(needed, 6);
            }
        }
    }

    #[test]
    fn culling_reduces_pool_to_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let session =
            DraftSession::blind_elimination(pool_of(30), &RulesConfig::default(), &mut rng)
                .unwrap();
        assert_eq!(session.pool().len(), 9);
        // eliminations first, then the standard turns
        assert_eq!(
            session.current_turn(),
            Some(Turn::Eliminate {
                player: Player::One
            })
        );
    }

    #[test]
    fn culling_is_deterministic_under_a_seeded_rng() {
        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);
        let a = DraftSession::blind_elimination(pool_of(20), &RulesConfig::default(), &mut rng_a)
            .unwrap();
        let b = DraftSession::blind_elimination(pool_of(20), &RulesConfig::default(), &mut rng_b)
            .unwrap();
        assert_eq!(names(a.pool()), names(b.pool()));
    }

    #[test]
    fn culling_leaves_small_pools_alone() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let session =
            DraftSession::blind_elimination(pool_of(9), &RulesConfig::default(), &mut rng)
                .unwrap();
        assert_eq!(session.pool().len(), 9);
    }

    #[test]
    fn blind_elimination_full_flow() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut session =
            DraftSession::blind_elimination(pool_of(25), &RulesConfig::default(), &mut rng)
                .unwrap();
        assert_eq!(session.pool().len(), 9);

        // two eliminations leave 7 for the standard turns
        session.step("1").unwrap();
        session.step("1").unwrap();
        assert_eq!(session.pool().len(), 7);
        assert_eq!(
            session.current_turn(),
            Some(Turn::Pick {
                player: Player::One,
                count: 1
            })
        );

        session.step("1").unwrap();
        session.step("1 2").unwrap();
        session.step("1 2").unwrap();
        let outcome = session.step("1").unwrap();
        assert_eq!(outcome, StepOutcome::Complete);

        let outcome = session.into_outcome();
        assert_eq!(outcome.player_one.len(), 3);
        assert_eq!(outcome.player_two.len(), 3);
    }

    #[test]
    fn eliminated_records_join_no_selection() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut session =
            DraftSession::blind_elimination(pool_of(9), &RulesConfig::default(), &mut rng)
                .unwrap();
        let first = session.pool()[0].protocol.clone();
        session.step("1").unwrap();

        assert!(!names(session.pool()).contains(&first));
        assert!(session.player_one.is_empty());
        assert!(session.player_two.is_empty());
    }

    #[test]
    fn step_after_completion_reports_complete() {
        let mut session = DraftSession::standard(pool_of(6)).unwrap();
        while !session.is_complete() {
            let turn = session.current_turn().unwrap();
            let input = if turn.demand() == 1 { "1" } else { "1 2" };
            session.step(input).unwrap();
        }
        assert_eq!(session.step("1"), Ok(StepOutcome::Complete));
    }
}
