//! Forward transition: one delivery applied to an innings.

use crate::engine::strike::{refresh_striker_flags, swap_ends};
use crate::error::{Result, Role, ScoringError};
use crate::models::outcome::DeliveryFlags;
use crate::models::{
    BallOutcome, BallRecord, InningsState, OverCounter, PlayerId, Selection, BALLS_PER_OVER,
};

pub struct ScoringEngine;

impl ScoringEngine {
    /// Apply `outcome` to `state` and return the next state.
    ///
    /// The rules run in a fixed order because later ones read fields the
    /// earlier ones wrote:
    ///
    /// 1. bowler runs conceded (nothing for byes/leg-byes)
    /// 2. innings total
    /// 3. extras breakdown
    /// 4. striker credit (not on a wide)
    /// 5. legal-ball counters, with overs projected from the raw counts
    /// 6. wicket
    /// 7. log the delivery
    /// 8. change ends on odd runs
    /// 9. end of over: release the bowler and change ends again
    ///
    /// `state` is left untouched on error.
    pub fn apply(state: &InningsState, outcome: &BallOutcome) -> Result<InningsState> {
        outcome.validate()?;

        let striker_id = state.striker_id.require(Role::Striker)?.clone();
        let non_striker_id = state.non_striker_id.require(Role::NonStriker)?;
        let bowler_id = state.current_bowler_id.require(Role::Bowler)?.clone();
        for id in [&striker_id, non_striker_id] {
            if !state.batting.contains_key(id) {
                return Err(ScoringError::UnknownPlayer { id: id.clone() });
            }
        }

        if u32::from(state.balls_in_current_over) >= BALLS_PER_OVER {
            return Err(ScoringError::InconsistentState(format!(
                "{} balls in the current over",
                state.balls_in_current_over
            )));
        }

        let mut next = state.clone();
        let over = next.legal_balls / BALLS_PER_OVER;
        let ball = next.balls_in_current_over + 1;

        let bowler = next
            .bowling
            .get_mut(&bowler_id)
            .ok_or_else(|| ScoringError::UnknownPlayer { id: bowler_id.clone() })?;
        let batter = next
            .batting
            .get_mut(&striker_id)
            .ok_or_else(|| ScoringError::UnknownPlayer { id: striker_id.clone() })?;

        // 1. Bowler
        credit(&mut bowler.runs_conceded, outcome.bowler_runs(), "bowler runs conceded")?;

        // 2. Total
        credit(&mut next.total_runs, outcome.ball_runs(), "total runs")?;

        // 3. Extras
        if outcome.is_wide {
            credit(&mut next.extras.wides, 1 + outcome.runs_off_bat, "wides")?;
        }
        if outcome.is_no_ball {
            credit(&mut next.extras.no_balls, 1 + outcome.runs_off_bat, "no-balls")?;
        }
        if outcome.is_bye {
            credit(&mut next.extras.byes, outcome.runs_off_bat, "byes")?;
        }
        if outcome.is_leg_bye {
            credit(&mut next.extras.leg_byes, outcome.runs_off_bat, "leg-byes")?;
        }

        // 4. Striker
        if outcome.faced() {
            credit(&mut batter.balls, 1, "balls faced")?;
            let runs = outcome.batter_runs();
            credit(&mut batter.runs, runs, "batter runs")?;
            match runs {
                4 => batter.fours += 1,
                6 => batter.sixes += 1,
                _ => {}
            }
        }

        // 5. Over progression
        if outcome.is_legal() {
            next.balls_in_current_over += 1;
            credit(&mut next.legal_balls, 1, "legal balls")?;
            next.overs = OverCounter::encode(next.legal_balls);
            bowler.set_balls_bowled(bowler.balls_bowled + 1);
        }

        // 6. Wicket
        if outcome.is_wicket {
            next.wickets += 1;
            bowler.wickets += 1;
            batter.out_by = Some(format!("b {}", bowler.name));
            next.striker_id = Selection::Awaiting;
        }

        // 7. Log
        next.recent_balls.push(BallRecord::from_outcome(
            outcome,
            ball,
            over,
            bowler_id.clone(),
            striker_id,
        ));

        // 8. Odd runs, wicket or not
        if outcome.runs_off_bat % 2 == 1 {
            swap_ends(&mut next);
        }

        // 9. End of over. After an odd-run swap the two swaps cancel out.
        if u32::from(next.balls_in_current_over) == BALLS_PER_OVER {
            next.balls_in_current_over = 0;
            next.current_bowler_id = Selection::Awaiting;
            swap_ends(&mut next);
            if is_maiden(&next.recent_balls, over, &bowler_id) {
                if let Some(bowler) = next.bowling.get_mut(&bowler_id) {
                    bowler.maidens += 1;
                }
            }
            log::debug!("over {} complete, {} awaiting a new bowler", over + 1, next.bowling_team);
        }

        refresh_striker_flags(&mut next);
        log::trace!(
            "applied {:?} -> {}/{} ({})",
            outcome,
            next.total_runs,
            next.wickets,
            next.overs
        );
        Ok(next)
    }
}

fn credit(counter: &mut u32, amount: u32, field: &str) -> Result<()> {
    *counter = counter.checked_add(amount).ok_or_else(|| {
        ScoringError::InconsistentState(format!("{field} would overflow"))
    })?;
    Ok(())
}

/// A completed over is a maiden when one bowler delivered all of it and
/// conceded nothing. Byes and leg-byes do not spoil it.
pub(crate) fn is_maiden(log: &[BallRecord], over: u32, bowler_id: &PlayerId) -> bool {
    let mut balls = log.iter().filter(|b| b.over == over).peekable();
    if balls.peek().is_none() {
        return false;
    }
    balls.all(|b| &b.bowler_id == bowler_id && b.bowler_runs() == 0)
}
