//! Authoritative state of one innings.
//!
//! Mutated only through [`crate::engine::ScoringEngine::apply`],
//! [`crate::engine::UndoEngine::revert`] and the nomination methods below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ball::BallRecord;
use super::ledger::{BattingEntry, BowlingEntry};
use super::outcome::DeliveryFlags;
use super::over::{OverCounter, OverNotation, BALLS_PER_OVER};
use super::PlayerId;
use crate::engine::strike;
use crate::error::{Result, Role, ScoringError};

/// A striker/non-striker/bowler slot.
///
/// `Awaiting` is the "operator must pick" state entered after a wicket or at
/// the end of an over. On the wire it is `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<PlayerId>", into = "Option<PlayerId>")]
pub enum Selection {
    #[default]
    Awaiting,
    Assigned(PlayerId),
}

impl Selection {
    pub fn id(&self) -> Option<&PlayerId> {
        match self {
            Selection::Awaiting => None,
            Selection::Assigned(id) => Some(id),
        }
    }

    pub fn is(&self, id: &PlayerId) -> bool {
        self.id() == Some(id)
    }

    pub(crate) fn require(&self, role: Role) -> Result<&PlayerId> {
        self.id().ok_or(ScoringError::MissingNomination { role })
    }
}

impl From<Option<PlayerId>> for Selection {
    fn from(value: Option<PlayerId>) -> Self {
        match value {
            Some(id) => Selection::Assigned(id),
            None => Selection::Awaiting,
        }
    }
}

impl From<Selection> for Option<PlayerId> {
    fn from(value: Selection) -> Self {
        match value {
            Selection::Awaiting => None,
            Selection::Assigned(id) => Some(id),
        }
    }
}

/// Extras breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extras {
    pub wides: u32,
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
}

impl Extras {
    pub fn total(&self) -> u32 {
        self.wides + self.no_balls + self.byes + self.leg_byes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsState {
    pub batting_team: String,
    pub bowling_team: String,
    pub total_runs: u32,
    pub wickets: u32,
    /// Legal balls bowled in the innings; `overs` is projected from it.
    #[serde(default)]
    pub legal_balls: u32,
    pub overs: OverNotation,
    /// 0..=5 between deliveries.
    pub balls_in_current_over: u8,
    pub extras: Extras,
    pub striker_id: Selection,
    pub non_striker_id: Selection,
    pub current_bowler_id: Selection,
    pub batting: BTreeMap<PlayerId, BattingEntry>,
    pub bowling: BTreeMap<PlayerId, BowlingEntry>,
    pub recent_balls: Vec<BallRecord>,
}

impl InningsState {
    pub fn new(batting_team: impl Into<String>, bowling_team: impl Into<String>) -> Self {
        Self {
            batting_team: batting_team.into(),
            bowling_team: bowling_team.into(),
            total_runs: 0,
            wickets: 0,
            legal_balls: 0,
            overs: OverNotation::ZERO,
            balls_in_current_over: 0,
            extras: Extras::default(),
            striker_id: Selection::Awaiting,
            non_striker_id: Selection::Awaiting,
            current_bowler_id: Selection::Awaiting,
            batting: BTreeMap::new(),
            bowling: BTreeMap::new(),
            recent_balls: Vec::new(),
        }
    }

    pub fn striker(&self) -> Option<&BattingEntry> {
        self.striker_id.id().and_then(|id| self.batting.get(id))
    }

    pub fn non_striker(&self) -> Option<&BattingEntry> {
        self.non_striker_id.id().and_then(|id| self.batting.get(id))
    }

    pub fn bowler(&self) -> Option<&BowlingEntry> {
        self.current_bowler_id.id().and_then(|id| self.bowling.get(id))
    }

    /// Slots the operator still has to fill before the next delivery.
    pub fn pending_nominations(&self) -> Vec<Role> {
        let mut pending = Vec::new();
        if self.striker_id == Selection::Awaiting {
            pending.push(Role::Striker);
        }
        if self.non_striker_id == Selection::Awaiting {
            pending.push(Role::NonStriker);
        }
        if self.current_bowler_id == Selection::Awaiting {
            pending.push(Role::Bowler);
        }
        pending
    }

    pub fn last_ball(&self) -> Option<&BallRecord> {
        self.recent_balls.last()
    }

    /// Deliveries of the over currently in progress (or just completed, when
    /// the last ball closed it).
    pub fn current_over_balls(&self) -> &[BallRecord] {
        let Some(last) = self.recent_balls.last() else {
            return &[];
        };
        let over = last.over;
        let start = self.recent_balls.iter().rposition(|b| b.over != over).map_or(0, |i| i + 1);
        &self.recent_balls[start..]
    }

    // ========================
    // Nomination
    // ========================

    pub fn nominate_striker(&mut self, id: PlayerId, name: &str) -> Result<()> {
        self.check_batter_available(&id, &self.non_striker_id)?;
        self.batting.entry(id.clone()).or_insert_with(|| BattingEntry::new(id.clone(), name));
        self.striker_id = Selection::Assigned(id);
        strike::refresh_striker_flags(self);
        Ok(())
    }

    pub fn nominate_non_striker(&mut self, id: PlayerId, name: &str) -> Result<()> {
        self.check_batter_available(&id, &self.striker_id)?;
        self.batting.entry(id.clone()).or_insert_with(|| BattingEntry::new(id.clone(), name));
        self.non_striker_id = Selection::Assigned(id);
        strike::refresh_striker_flags(self);
        Ok(())
    }

    pub fn nominate_bowler(&mut self, id: PlayerId, name: &str) -> Result<()> {
        self.bowling.entry(id.clone()).or_insert_with(|| BowlingEntry::new(id.clone(), name));
        self.current_bowler_id = Selection::Assigned(id);
        Ok(())
    }

    fn check_batter_available(&self, id: &PlayerId, other_end: &Selection) -> Result<()> {
        if other_end.is(id) {
            return Err(ScoringError::InvalidNomination(format!(
                "{id} is already batting at the other end"
            )));
        }
        if let Some(entry) = self.batting.get(id) {
            if let Some(how) = &entry.out_by {
                return Err(ScoringError::InvalidNomination(format!("{id} is out ({how})")));
            }
        }
        Ok(())
    }

    // ========================
    // Integrity
    // ========================

    pub fn legal_deliveries(&self) -> u32 {
        self.recent_balls.iter().filter(|b| b.is_legal()).count() as u32
    }

    /// Verify every counter against the ball log.
    pub fn check_invariants(&self) -> Result<()> {
        let fail = |msg: String| Err(ScoringError::InconsistentState(msg));

        let logged_runs: u32 = self.recent_balls.iter().map(|b| b.ball_runs()).sum();
        if self.total_runs != logged_runs {
            return fail(format!("total {} != logged runs {}", self.total_runs, logged_runs));
        }

        let logged_wickets = self.recent_balls.iter().filter(|b| b.is_wicket).count() as u32;
        if self.wickets != logged_wickets {
            return fail(format!("wickets {} != logged {}", self.wickets, logged_wickets));
        }

        let legal = self.legal_deliveries();
        if self.legal_balls != legal {
            return fail(format!("legal balls {} != logged {}", self.legal_balls, legal));
        }
        if self.overs != OverCounter::encode(legal) {
            return fail(format!("overs {} do not match {} legal balls", self.overs, legal));
        }
        if u32::from(self.balls_in_current_over) != legal % BALLS_PER_OVER {
            return fail(format!("ball in over {} out of step", self.balls_in_current_over));
        }

        let mut extras = Extras::default();
        for ball in &self.recent_balls {
            if ball.is_wide {
                extras.wides += 1 + ball.runs_off_bat;
            }
            if ball.is_no_ball {
                extras.no_balls += 1 + ball.runs_off_bat;
            }
            if ball.is_bye {
                extras.byes += ball.runs_off_bat;
            }
            if ball.is_leg_bye {
                extras.leg_byes += ball.runs_off_bat;
            }
        }
        if self.extras != extras {
            return fail(format!("extras {:?} != logged {:?}", self.extras, extras));
        }

        let mut bowled_total = 0;
        for (id, bowler) in &self.bowling {
            let logged = self
                .recent_balls
                .iter()
                .filter(|b| b.is_legal() && &b.bowler_id == id)
                .count() as u32;
            if bowler.balls_bowled != logged || bowler.overs != OverCounter::encode(logged) {
                return fail(format!("bowler {id} figures out of step with log"));
            }
            bowled_total += bowler.balls_bowled;
        }
        if bowled_total != legal {
            return fail(format!("bowlers' balls {bowled_total} != legal balls {legal}"));
        }

        for selection in [&self.striker_id, &self.non_striker_id] {
            if let Some(id) = selection.id() {
                if !self.batting.contains_key(id) {
                    return Err(ScoringError::UnknownPlayer { id: id.clone() });
                }
            }
        }
        if let Some(id) = self.current_bowler_id.id() {
            if !self.bowling.contains_key(id) {
                return Err(ScoringError::UnknownPlayer { id: id.clone() });
            }
        }

        for (id, entry) in &self.batting {
            if entry.is_striker != self.striker_id.is(id) {
                return fail(format!("striker flag on {id} disagrees with selection"));
            }
        }

        Ok(())
    }
}
