//! Reverse transition: withdraw the most recent delivery.
//!
//! Plain integer sums are reversed by subtracting the same quantities the
//! forward path added, recomputed from the popped record. Over counts are
//! not reversed at all: they are re-derived from what remains of the log.

use crate::engine::scoring::is_maiden;
use crate::engine::strike::{refresh_striker_flags, swap_ends};
use crate::error::{Result, ScoringError};
use crate::models::outcome::DeliveryFlags;
use crate::models::{InningsState, OverCounter, Selection, BALLS_PER_OVER};

pub struct UndoEngine;

impl UndoEngine {
    /// Remove the last logged delivery and return the state before it.
    ///
    /// For any state `s` that `ScoringEngine::apply(s, o)` accepts,
    /// `revert(apply(s, o)) == s`.
    pub fn revert(state: &InningsState) -> Result<InningsState> {
        let mut next = state.clone();
        let record = next.recent_balls.pop().ok_or(ScoringError::EmptyLog)?;

        let bowler = next
            .bowling
            .get_mut(&record.bowler_id)
            .ok_or_else(|| ScoringError::UnknownPlayer { id: record.bowler_id.clone() })?;
        let batter = next
            .batting
            .get_mut(&record.striker_id)
            .ok_or_else(|| ScoringError::UnknownPlayer { id: record.striker_id.clone() })?;

        take(&mut bowler.runs_conceded, record.bowler_runs(), "bowler runs conceded")?;
        take(&mut next.total_runs, record.ball_runs(), "total runs")?;

        if record.is_wide {
            take(&mut next.extras.wides, 1 + record.runs_off_bat, "wides")?;
        }
        if record.is_no_ball {
            take(&mut next.extras.no_balls, 1 + record.runs_off_bat, "no-balls")?;
        }
        if record.is_bye {
            take(&mut next.extras.byes, record.runs_off_bat, "byes")?;
        }
        if record.is_leg_bye {
            take(&mut next.extras.leg_byes, record.runs_off_bat, "leg-byes")?;
        }

        if record.faced() {
            take(&mut batter.balls, 1, "balls faced")?;
            let runs = record.batter_runs();
            take(&mut batter.runs, runs, "batter runs")?;
            match runs {
                4 => take(&mut batter.fours, 1, "fours")?,
                6 => take(&mut batter.sixes, 1, "sixes")?,
                _ => {}
            }
        }

        if record.is_wicket {
            take(&mut next.wickets, 1, "wickets")?;
            take(&mut bowler.wickets, 1, "bowler wickets")?;
            batter.out_by = None;
        }

        if record.is_legal() {
            // Legal balls left by this bowler, counted from the log.
            let bowled = next
                .recent_balls
                .iter()
                .filter(|b| b.is_legal() && b.bowler_id == record.bowler_id)
                .count() as u32;
            if bowler.balls_bowled.checked_sub(1) != Some(bowled) {
                return Err(ScoringError::InconsistentState(format!(
                    "bowler {} has {} balls but the log holds {}",
                    record.bowler_id,
                    bowler.balls_bowled,
                    bowled + 1
                )));
            }
            bowler.set_balls_bowled(bowled);

            if record.ends_over() && is_maiden(&state.recent_balls, record.over, &record.bowler_id)
            {
                take(&mut bowler.maidens, 1, "maidens")?;
            }

            let legal = next.legal_deliveries();
            next.legal_balls = legal;
            next.overs = OverCounter::encode(legal);
            // remainder < 6 always fits
            next.balls_in_current_over = (legal % BALLS_PER_OVER) as u8;
        }

        // Selections are restored in the reverse order apply changed them.
        if record.ends_over() {
            next.current_bowler_id = Selection::Assigned(record.bowler_id.clone());
            swap_ends(&mut next);
        }
        if record.runs_off_bat % 2 == 1 {
            swap_ends(&mut next);
        }
        if record.is_wicket {
            next.striker_id = Selection::Assigned(record.striker_id.clone());
        }

        refresh_striker_flags(&mut next);
        log::trace!(
            "reverted {:?} -> {}/{} ({})",
            record,
            next.total_runs,
            next.wickets,
            next.overs
        );
        Ok(next)
    }
}

fn take(counter: &mut u32, amount: u32, field: &str) -> Result<()> {
    *counter = counter.checked_sub(amount).ok_or_else(|| {
        ScoringError::InconsistentState(format!("{field} would drop below zero"))
    })?;
    Ok(())
}
