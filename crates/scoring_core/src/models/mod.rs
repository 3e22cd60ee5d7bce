pub mod ball;
pub mod innings;
pub mod ledger;
pub mod outcome;
pub mod over;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use ball::BallRecord;
pub use innings::{Extras, InningsState, Selection};
pub use ledger::{BattingEntry, BowlingEntry};
pub use outcome::{BallOutcome, MAX_RUNS_OFF_BAT};
pub use over::{OverCounter, OverNotation, ParseOverError, BALLS_PER_OVER};

/// Opaque player identifier supplied by the roster owner.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
