use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Most runs that can be entered for one delivery (a boundary plus overthrows).
pub const MAX_RUNS_OFF_BAT: u32 = 7;

/// What happened on one delivery, as entered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallOutcome {
    pub runs_off_bat: u32,
    #[serde(default)]
    pub is_wide: bool,
    #[serde(default)]
    pub is_no_ball: bool,
    #[serde(default)]
    pub is_bye: bool,
    #[serde(default)]
    pub is_leg_bye: bool,
    #[serde(default)]
    pub is_wicket: bool,
}

impl BallOutcome {
    /// A legal delivery with `runs` taken off the bat.
    pub fn runs(runs: u32) -> Self {
        Self { runs_off_bat: runs, ..Default::default() }
    }

    pub fn dot() -> Self {
        Self::runs(0)
    }

    pub fn wide(runs: u32) -> Self {
        Self { runs_off_bat: runs, is_wide: true, ..Default::default() }
    }

    pub fn no_ball(runs: u32) -> Self {
        Self { runs_off_bat: runs, is_no_ball: true, ..Default::default() }
    }

    pub fn bye(runs: u32) -> Self {
        Self { runs_off_bat: runs, is_bye: true, ..Default::default() }
    }

    pub fn leg_bye(runs: u32) -> Self {
        Self { runs_off_bat: runs, is_leg_bye: true, ..Default::default() }
    }

    pub fn wicket() -> Self {
        Self { is_wicket: true, ..Default::default() }
    }

    pub fn with_wicket(mut self) -> Self {
        self.is_wicket = true;
        self
    }

    /// Reject contradictory flag combinations and impossible run counts.
    pub fn validate(&self) -> Result<()> {
        if self.runs_off_bat > MAX_RUNS_OFF_BAT {
            return Err(ScoringError::InvalidOutcome(format!(
                "{} runs off one delivery (at most {MAX_RUNS_OFF_BAT})",
                self.runs_off_bat
            )));
        }
        if self.is_wide && self.is_no_ball {
            return Err(ScoringError::InvalidOutcome("wide and no-ball together".into()));
        }
        if self.is_bye && self.is_leg_bye {
            return Err(ScoringError::InvalidOutcome("bye and leg-bye together".into()));
        }
        if self.is_wide && (self.is_bye || self.is_leg_bye) {
            return Err(ScoringError::InvalidOutcome("byes cannot be run off a wide".into()));
        }
        Ok(())
    }
}

/// Delivery arithmetic shared by the forward and reverse paths. Both sides
/// recompute these from the same flags so neither reads a cached delta.
pub(crate) trait DeliveryFlags {
    fn runs_off_bat(&self) -> u32;
    fn is_wide(&self) -> bool;
    fn is_no_ball(&self) -> bool;
    fn is_bye(&self) -> bool;
    fn is_leg_bye(&self) -> bool;

    fn is_legal(&self) -> bool {
        !self.is_wide() && !self.is_no_ball()
    }

    fn is_byes(&self) -> bool {
        self.is_bye() || self.is_leg_bye()
    }

    /// One-run penalty for a wide or no-ball.
    fn penalty(&self) -> u32 {
        if self.is_legal() {
            0
        } else {
            1
        }
    }

    /// Added to the innings total.
    fn ball_runs(&self) -> u32 {
        self.runs_off_bat() + self.penalty()
    }

    /// Charged to the bowler. Byes and leg-byes never are.
    fn bowler_runs(&self) -> u32 {
        if self.is_byes() {
            0
        } else {
            self.runs_off_bat() + self.penalty()
        }
    }

    /// Credited to the striker.
    fn batter_runs(&self) -> u32 {
        if self.is_wide() || self.is_byes() {
            0
        } else {
            self.runs_off_bat()
        }
    }

    /// Everything except a wide counts as a ball faced.
    fn faced(&self) -> bool {
        !self.is_wide()
    }
}

impl DeliveryFlags for BallOutcome {
    fn runs_off_bat(&self) -> u32 {
        self.runs_off_bat
    }
    fn is_wide(&self) -> bool {
        self.is_wide
    }
    fn is_no_ball(&self) -> bool {
        self.is_no_ball
    }
    fn is_bye(&self) -> bool {
        self.is_bye
    }
    fn is_leg_bye(&self) -> bool {
        self.is_leg_bye
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contradictory_flags_rejected() {
        let wide_no_ball = BallOutcome { is_wide: true, is_no_ball: true, ..Default::default() };
        assert!(matches!(wide_no_ball.validate(), Err(ScoringError::InvalidOutcome(_))));

        let wide_bye = BallOutcome { is_bye: true, ..BallOutcome::wide(1) };
        assert!(wide_bye.validate().is_err());

        let both_byes = BallOutcome { is_leg_bye: true, ..BallOutcome::bye(2) };
        assert!(both_byes.validate().is_err());
    }

    #[test]
    fn test_run_count_capped() {
        assert!(BallOutcome::runs(MAX_RUNS_OFF_BAT).validate().is_ok());
        assert!(matches!(
            BallOutcome::runs(MAX_RUNS_OFF_BAT + 1).validate(),
            Err(ScoringError::InvalidOutcome(_))
        ));
        assert!(BallOutcome::wide(u32::MAX).validate().is_err());
    }

    #[test]
    fn test_no_ball_byes_are_allowed() {
        let outcome = BallOutcome { is_bye: true, ..BallOutcome::no_ball(1) };
        assert!(outcome.validate().is_ok());
        assert_eq!(outcome.ball_runs(), 2);
        assert_eq!(outcome.bowler_runs(), 0);
        assert_eq!(outcome.batter_runs(), 0);
        assert!(outcome.faced());
    }

    #[test]
    fn test_deserializes_with_missing_flags() {
        let outcome: BallOutcome = serde_json::from_str(r#"{"runsOffBat": 4}"#).unwrap();
        assert_eq!(outcome, BallOutcome::runs(4));
    }
}
