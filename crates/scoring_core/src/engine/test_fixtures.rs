//! Shared innings fixtures for engine tests.

use crate::engine::ScoringEngine;
use crate::models::{BallOutcome, InningsState, PlayerId, Selection};

/// Fresh innings: smith on strike, nelson at the other end, bowler "brown".
pub(crate) fn ready_innings() -> InningsState {
    let mut state = InningsState::new("home", "away");
    state.nominate_striker(PlayerId::from("smith"), "Smith").unwrap();
    state.nominate_non_striker(PlayerId::from("nelson"), "Nelson").unwrap();
    state.nominate_bowler(PlayerId::from("brown"), "Brown").unwrap();
    state
}

/// Fill any empty slot the way an operator would: new batters are numbered,
/// bowlers alternate between two ends.
pub(crate) fn nominate_pending(state: &mut InningsState) {
    if state.striker_id == Selection::Awaiting {
        let n = state.batting.len();
        state.nominate_striker(PlayerId::new(format!("bat{n}")), &format!("Batter {n}")).unwrap();
    }
    if state.non_striker_id == Selection::Awaiting {
        let n = state.batting.len();
        state
            .nominate_non_striker(PlayerId::new(format!("bat{n}")), &format!("Batter {n}"))
            .unwrap();
    }
    if state.current_bowler_id == Selection::Awaiting {
        let over = state.legal_balls / 6;
        let (id, name) = if over % 2 == 0 { ("brown", "Brown") } else { ("green", "Green") };
        state.nominate_bowler(PlayerId::from(id), name).unwrap();
    }
}

/// Apply each outcome in turn, nominating between deliveries as needed.
pub(crate) fn play(mut state: InningsState, outcomes: &[BallOutcome]) -> InningsState {
    for outcome in outcomes {
        nominate_pending(&mut state);
        state = ScoringEngine::apply(&state, outcome).unwrap();
    }
    state
}
