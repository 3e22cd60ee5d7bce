//! Property tests over random delivery sequences.

use proptest::prelude::*;

use crate::engine::test_fixtures::{nominate_pending, play, ready_innings};
use crate::engine::{ScoringEngine, UndoEngine};
use crate::models::{BallOutcome, InningsState};

/// Any outcome that passes validation.
pub fn outcome_strategy() -> impl Strategy<Value = BallOutcome> {
    let kind = prop_oneof![
        6 => Just((false, false, false, false)),
        1 => Just((true, false, false, false)),
        1 => Just((false, true, false, false)),
        1 => Just((false, false, true, false)),
        1 => Just((false, false, false, true)),
        1 => Just((false, true, true, false)),
        1 => Just((false, true, false, true)),
    ];
    (0u32..=7, kind, prop::bool::weighted(0.1)).prop_map(
        |(runs_off_bat, (is_wide, is_no_ball, is_bye, is_leg_bye), is_wicket)| BallOutcome {
            runs_off_bat,
            is_wide,
            is_no_ball,
            is_bye,
            is_leg_bye,
            is_wicket,
        },
    )
}

/// A fully nominated innings reached by playing random deliveries.
pub fn innings_strategy() -> impl Strategy<Value = InningsState> {
    prop::collection::vec(outcome_strategy(), 0..60).prop_map(|outcomes| {
        let mut state = play(ready_innings(), &outcomes);
        nominate_pending(&mut state);
        state
    })
}

proptest! {
    /// Property: undo is an exact left-inverse of one delivery
    #[test]
    fn prop_revert_inverts_apply(state in innings_strategy(), outcome in outcome_strategy()) {
        let applied = ScoringEngine::apply(&state, &outcome).unwrap();
        let reverted = UndoEngine::revert(&applied).unwrap();
        prop_assert_eq!(reverted, state);
    }

    /// Property: the total moves by exactly the delivery's runs
    #[test]
    fn prop_runs_conserved(state in innings_strategy(), outcome in outcome_strategy()) {
        let applied = ScoringEngine::apply(&state, &outcome).unwrap();
        let penalty = u32::from(outcome.is_wide || outcome.is_no_ball);
        prop_assert_eq!(applied.total_runs, state.total_runs + outcome.runs_off_bat + penalty);
    }

    /// Property: bowlers' legal balls always equal the legal entries in the log
    #[test]
    fn prop_legal_balls_conserved(outcomes in prop::collection::vec(outcome_strategy(), 0..120)) {
        let state = play(ready_innings(), &outcomes);
        let bowled: u32 = state.bowling.values().map(|b| b.balls_bowled).sum();
        let logged =
            state.recent_balls.iter().filter(|b| !b.is_wide && !b.is_no_ball).count() as u32;
        prop_assert_eq!(bowled, logged);
        prop_assert!(state.balls_in_current_over < 6);
        prop_assert!(state.check_invariants().is_ok());
    }

    /// Property: the sixth legal ball swaps strike only on even runs
    #[test]
    fn prop_over_end_strike(runs in 0u32..=6) {
        let state = play(ready_innings(), &[BallOutcome::dot(); 5]);
        let next = ScoringEngine::apply(&state, &BallOutcome::runs(runs)).unwrap();
        if runs % 2 == 1 {
            prop_assert_eq!(&next.striker_id, &state.striker_id);
            prop_assert_eq!(&next.non_striker_id, &state.non_striker_id);
        } else {
            prop_assert_eq!(&next.striker_id, &state.non_striker_id);
            prop_assert_eq!(&next.non_striker_id, &state.striker_id);
        }
    }

    /// Property: any undo/redo interleaving keeps every counter in step with the log
    #[test]
    fn prop_undo_redo_cycles_stay_consistent(
        steps in prop::collection::vec((outcome_strategy(), any::<bool>()), 1..80)
    ) {
        let mut state = ready_innings();
        for (outcome, undo) in steps {
            if undo && !state.recent_balls.is_empty() {
                state = UndoEngine::revert(&state).unwrap();
            } else {
                nominate_pending(&mut state);
                state = ScoringEngine::apply(&state, &outcome).unwrap();
            }
            prop_assert!(state.check_invariants().is_ok());
        }
    }
}
