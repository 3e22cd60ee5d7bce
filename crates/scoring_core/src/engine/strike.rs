//! Strike rotation shared by the forward and reverse paths.

use crate::models::InningsState;

/// Batters change ends. Either slot may be `Awaiting`.
pub(crate) fn swap_ends(state: &mut InningsState) {
    std::mem::swap(&mut state.striker_id, &mut state.non_striker_id);
}

/// Re-derive every `is_striker` flag from the striker slot.
pub(crate) fn refresh_striker_flags(state: &mut InningsState) {
    let InningsState { batting, striker_id, .. } = state;
    for (id, entry) in batting.iter_mut() {
        entry.is_striker = striker_id.is(id);
    }
}
