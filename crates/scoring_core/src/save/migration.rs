use super::error::SaveError;
use super::format::InningsSave;
use super::SAVE_VERSION;
use crate::models::{InningsState, OverCounter, BALLS_PER_OVER};

/// Migrate snapshot data from older versions to current version
pub fn migrate_save(mut save: InningsSave) -> Result<InningsSave, SaveError> {
    let original_version = save.version;

    save = match save.version {
        0 => migrate_v0_to_v1(save)?,
        SAVE_VERSION => save,
        _ => {
            return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
        }
    };

    save.version = SAVE_VERSION;

    if original_version != SAVE_VERSION {
        save.update_timestamp();
        log::info!(
            "Migrated innings {} from version {} to {}",
            save.innings_id,
            original_version,
            SAVE_VERSION
        );
    }

    Ok(save)
}

/// Version 0 kept only over notation. Rebuild the raw legal-ball counters
/// from the ball log and re-project every over value from them.
fn migrate_v0_to_v1(mut save: InningsSave) -> Result<InningsSave, SaveError> {
    log::info!("Migrating innings {} from version 0 to 1", save.innings_id);

    rebuild_ball_counters(&mut save.state);

    Ok(save)
}

fn rebuild_ball_counters(state: &mut InningsState) {
    let legal = state.legal_deliveries();
    if state.overs != OverCounter::encode(legal) {
        log::warn!(
            "Stored overs {} disagree with {} logged legal balls, using the log",
            state.overs,
            legal
        );
    }
    state.legal_balls = legal;
    state.overs = OverCounter::encode(legal);
    // remainder < 6 always fits
    state.balls_in_current_over = (legal % BALLS_PER_OVER) as u8;

    for (id, bowler) in state.bowling.iter_mut() {
        let bowled = state
            .recent_balls
            .iter()
            .filter(|b| b.is_legal() && &b.bowler_id == id)
            .count() as u32;
        bowler.set_balls_bowled(bowled);
    }
}
