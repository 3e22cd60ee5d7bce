//! JSON boundary for controllers that hold innings state as documents.
//!
//! Errors come back as `"CODE: message"` strings so a caller can branch on
//! the code without parsing prose.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{ScoringEngine, UndoEngine};
use crate::error::ScoringError;
use crate::models::{BallOutcome, InningsState};
use crate::scorecard::Scorecard;
use crate::session::{ScoringSession, SESSIONS};

const PARSE_STATE: &str = "INVALID_STATE_JSON";
const PARSE_OUTCOME: &str = "INVALID_OUTCOME_JSON";
const SERIALIZE: &str = "SERIALIZATION_FAILED";
const NO_SESSION: &str = "SESSION_NOT_FOUND";

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn scoring_err(err: ScoringError) -> String {
    if !err.is_operator_error() {
        warn!(error = %err, "innings state failed integrity checks");
    }
    err_code(err.code(), err)
}

fn parse_state(state_json: &str) -> Result<InningsState, String> {
    serde_json::from_str(state_json).map_err(|e| err_code(PARSE_STATE, e))
}

/// Parse a state document the engine is about to transition.
fn parse_checked_state(state_json: &str) -> Result<InningsState, String> {
    let state = parse_state(state_json)?;
    state.check_invariants().map_err(scoring_err)?;
    Ok(state)
}

fn parse_outcome(outcome_json: &str) -> Result<BallOutcome, String> {
    serde_json::from_str(outcome_json).map_err(|e| err_code(PARSE_OUTCOME, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| err_code(SERIALIZE, e))
}

/// Apply one delivery to a state document and return the next state document.
pub fn apply_ball_json(state_json: &str, outcome_json: &str) -> Result<String, String> {
    let state = parse_checked_state(state_json)?;
    let outcome = parse_outcome(outcome_json)?;
    let next = ScoringEngine::apply(&state, &outcome).map_err(scoring_err)?;
    to_json(&next)
}

/// Withdraw the last delivery from a state document.
pub fn revert_json(state_json: &str) -> Result<String, String> {
    let state = parse_checked_state(state_json)?;
    let next = UndoEngine::revert(&state).map_err(scoring_err)?;
    to_json(&next)
}

pub fn scorecard_json(state_json: &str) -> Result<String, String> {
    let state = parse_state(state_json)?;
    to_json(&Scorecard::from_state(&state))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub innings_id: String,
    pub version: u64,
    pub state: InningsState,
}

impl From<&ScoringSession> for SessionResponse {
    fn from(session: &ScoringSession) -> Self {
        Self {
            innings_id: session.innings_id().to_string(),
            version: session.version(),
            state: session.state().clone(),
        }
    }
}

/// Register a session in the process-wide table, starting at version 0.
pub fn open_session_json(innings_id: &str, state_json: &str) -> Result<String, String> {
    let state = parse_checked_state(state_json)?;
    let session = ScoringSession::new(innings_id, state);
    let response = SessionResponse::from(&session);
    SESSIONS.open(session);
    debug!(innings = innings_id, "session opened over JSON");
    to_json(&response)
}

/// Score a delivery on a registered session.
pub fn record_ball_json(
    innings_id: &str,
    expected_version: u64,
    outcome_json: &str,
) -> Result<String, String> {
    let outcome = parse_outcome(outcome_json)?;
    let response = SESSIONS
        .with_session(innings_id, |session| {
            session.record(expected_version, &outcome)?;
            Ok::<_, ScoringError>(SessionResponse::from(&*session))
        })
        .ok_or_else(|| err_code(NO_SESSION, innings_id))?
        .map_err(scoring_err)?;
    to_json(&response)
}

/// Undo the last delivery on a registered session.
pub fn undo_ball_json(innings_id: &str, expected_version: u64) -> Result<String, String> {
    let response = SESSIONS
        .with_session(innings_id, |session| {
            session.undo(expected_version)?;
            Ok::<_, ScoringError>(SessionResponse::from(&*session))
        })
        .ok_or_else(|| err_code(NO_SESSION, innings_id))?
        .map_err(scoring_err)?;
    to_json(&response)
}
