//! Single-writer scoring sessions.
//!
//! The engine has no locking of its own. A [`ScoringSession`] owns the
//! latest state of one innings plus a version number; every mutation names
//! the version it was computed against and is refused when that version is
//! stale, so two operators can never both score against the same snapshot.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

use crate::engine::{ScoringEngine, UndoEngine};
use crate::error::{Result, Role, ScoringError};
use crate::models::{BallOutcome, BallRecord, InningsState, PlayerId};
use crate::save::InningsSave;

/// Process-wide session table.
pub static SESSIONS: Lazy<SessionRegistry> = Lazy::new(SessionRegistry::new);

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSession {
    innings_id: String,
    version: u64,
    state: InningsState,
}

impl ScoringSession {
    pub fn new(innings_id: impl Into<String>, state: InningsState) -> Self {
        Self { innings_id: innings_id.into(), version: 0, state }
    }

    /// Resume from a persisted snapshot.
    pub fn from_save(save: InningsSave) -> Self {
        Self { innings_id: save.innings_id, version: save.session_version, state: save.state }
    }

    pub fn to_save(&self) -> InningsSave {
        InningsSave::new(self.innings_id.clone(), self.version, self.state.clone())
    }

    pub fn innings_id(&self) -> &str {
        &self.innings_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self) -> &InningsState {
        &self.state
    }

    /// Score one delivery against `expected_version`.
    pub fn record(&mut self, expected_version: u64, outcome: &BallOutcome) -> Result<&BallRecord> {
        self.check_version(expected_version)?;
        let next = ScoringEngine::apply(&self.state, outcome).map_err(|e| {
            warn!(innings = %self.innings_id, error = %e, "delivery rejected");
            e
        })?;
        self.commit(next);

        let record = self.state.recent_balls.last().ok_or(ScoringError::EmptyLog)?;
        info!(
            innings = %self.innings_id,
            version = self.version,
            ball = %record.display_token(),
            score = %format!("{}/{}", self.state.total_runs, self.state.wickets),
            overs = %self.state.overs,
            "delivery recorded"
        );
        Ok(record)
    }

    /// Withdraw the last delivery against `expected_version`.
    pub fn undo(&mut self, expected_version: u64) -> Result<BallRecord> {
        self.check_version(expected_version)?;
        let removed = self.state.recent_balls.last().cloned().ok_or(ScoringError::EmptyLog)?;
        let next = UndoEngine::revert(&self.state).map_err(|e| {
            warn!(innings = %self.innings_id, error = %e, "undo rejected");
            e
        })?;
        self.commit(next);
        info!(
            innings = %self.innings_id,
            version = self.version,
            ball = %removed.display_token(),
            "delivery withdrawn"
        );
        Ok(removed)
    }

    pub fn nominate(
        &mut self,
        expected_version: u64,
        role: Role,
        id: PlayerId,
        name: &str,
    ) -> Result<()> {
        self.check_version(expected_version)?;
        let mut next = self.state.clone();
        match role {
            Role::Striker => next.nominate_striker(id.clone(), name)?,
            Role::NonStriker => next.nominate_non_striker(id.clone(), name)?,
            Role::Bowler => next.nominate_bowler(id.clone(), name)?,
        }
        self.commit(next);
        debug!(innings = %self.innings_id, %role, player = %id, "nominated");
        Ok(())
    }

    fn check_version(&self, expected: u64) -> Result<()> {
        if expected != self.version {
            warn!(innings = %self.innings_id, expected, actual = self.version, "stale write");
            return Err(ScoringError::StaleVersion { expected, actual: self.version });
        }
        Ok(())
    }

    fn commit(&mut self, next: InningsState) {
        self.state = next;
        self.version += 1;
    }
}

/// Sessions keyed by innings id. All mutation goes through the write lock,
/// one innings update at a time.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, ScoringSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, replacing any previous one with the same id.
    pub fn open(&self, session: ScoringSession) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        debug!(innings = %session.innings_id, "session opened");
        sessions.insert(session.innings_id.clone(), session);
    }

    /// Snapshot of a session.
    pub fn get(&self, innings_id: &str) -> Option<ScoringSession> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.get(innings_id).cloned()
    }

    /// Run `f` with exclusive access to one session.
    pub fn with_session<T>(
        &self,
        innings_id: &str,
        f: impl FnOnce(&mut ScoringSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.get_mut(innings_id).map(f)
    }

    pub fn close(&self, innings_id: &str) -> Option<ScoringSession> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(innings_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
