use serde::{Deserialize, Serialize};

pub const MASTERY_MIN: f64 = 0.0;
pub const MASTERY_MAX: f64 = 100.0;

/// Mastery ceiling for flip mode. Flip study alone can never push a deck
/// past this value; other modes may raise mastery all the way to 100.
pub const FLIP_MODE_CAP: f64 = 50.0;

const DEFAULT_FIRST_MINUTE_GAIN: f64 = 5.0;
const DEFAULT_PER_MINUTE_GAIN: f64 = 2.0;

/// Named strategy for presenting flashcards. Each mode carries its own
/// mastery-cap policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudyMode {
    Flip,
    Quiz,
    AdaptiveQuiz,
}

impl StudyMode {
    pub fn mastery_cap(self) -> f64 {
        match self {
            StudyMode::Flip => FLIP_MODE_CAP,
            StudyMode::Quiz | StudyMode::AdaptiveQuiz => MASTERY_MAX,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StudyMode::Flip => "flip",
            StudyMode::Quiz => "quiz",
            StudyMode::AdaptiveQuiz => "adaptive-quiz",
        }
    }
}

/// Gain curve parameters. The curve shape is a product knob, not a law:
/// a step function over full minutes studied, front-loaded on the first
/// minute so short sessions still register.
#[derive(Debug, Clone, Copy)]
pub struct MasteryPolicy {
    pub first_minute_gain: f64,
    pub per_minute_gain: f64,
}

impl Default for MasteryPolicy {
    fn default() -> Self {
        Self {
            first_minute_gain: DEFAULT_FIRST_MINUTE_GAIN,
            per_minute_gain: DEFAULT_PER_MINUTE_GAIN,
        }
    }
}

impl MasteryPolicy {
    /// Computes the mastery a session would end with. Referentially pure:
    /// same inputs always produce the same output, so the UI can preview
    /// the gain before the learner confirms ending the session.
    ///
    /// If `initial_mastery` already sits at or above the mode cap the value
    /// is returned unchanged: a capped mode neither erodes nor raises it.
    pub fn compute(&self, initial_mastery: f64, elapsed_seconds: u64, mode: StudyMode) -> f64 {
        let initial = initial_mastery.clamp(MASTERY_MIN, MASTERY_MAX);
        let cap = mode.mastery_cap();
        if initial >= cap {
            return initial;
        }

        let full_minutes = elapsed_seconds / 60;
        let gain = match full_minutes {
            0 => 0.0,
            n => self.first_minute_gain + self.per_minute_gain * (n - 1) as f64,
        };

        (initial + gain).min(cap)
    }

    /// Gain the learner would see in the end-session confirmation.
    pub fn projected_gain(&self, initial_mastery: f64, elapsed_seconds: u64, mode: StudyMode) -> f64 {
        self.compute(initial_mastery, elapsed_seconds, mode) - initial_mastery.clamp(MASTERY_MIN, MASTERY_MAX)
    }

    /// True when the mode cap blocks any further gain for this deck.
    pub fn cap_reached(&self, initial_mastery: f64, elapsed_seconds: u64, mode: StudyMode) -> bool {
        let new = self.compute(initial_mastery, elapsed_seconds, mode);
        new >= mode.mastery_cap() && mode.mastery_cap() < MASTERY_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_gain_under_one_minute() {
        let policy = MasteryPolicy::default();
        assert_eq!(policy.compute(10.0, 0, StudyMode::Flip), 10.0);
        assert_eq!(policy.compute(10.0, 59, StudyMode::Flip), 10.0);
    }

    #[test]
    fn first_minute_grants_base_gain() {
        let policy = MasteryPolicy::default();
        assert_eq!(policy.compute(0.0, 90, StudyMode::Flip), 5.0);
    }

    #[test]
    fn gain_is_monotone_in_time() {
        let policy = MasteryPolicy::default();
        let mut last = 0.0;
        for secs in (0..600).step_by(30) {
            let new = policy.compute(0.0, secs, StudyMode::Flip);
            assert!(new >= last);
            last = new;
        }
    }

    #[test]
    fn flip_mode_clamps_to_fifty() {
        let policy = MasteryPolicy::default();
        assert_eq!(policy.compute(48.0, 3600, StudyMode::Flip), 50.0);
        assert_eq!(policy.compute(50.0, 3600, StudyMode::Flip), 50.0);
    }

    #[test]
    fn flip_mode_never_erodes_high_mastery() {
        let policy = MasteryPolicy::default();
        assert_eq!(policy.compute(73.0, 3600, StudyMode::Flip), 73.0);
        assert_eq!(policy.compute(100.0, 60, StudyMode::Flip), 100.0);
    }

    #[test]
    fn quiz_mode_caps_at_hundred() {
        let policy = MasteryPolicy::default();
        assert_eq!(policy.compute(99.0, 7200, StudyMode::Quiz), 100.0);
    }

    #[test]
    fn cap_reached_only_for_capped_modes() {
        let policy = MasteryPolicy::default();
        assert!(policy.cap_reached(49.0, 120, StudyMode::Flip));
        assert!(!policy.cap_reached(10.0, 120, StudyMode::Flip));
        assert!(!policy.cap_reached(99.0, 7200, StudyMode::Quiz));
    }

    #[test]
    fn projected_gain_matches_compute_delta() {
        let policy = MasteryPolicy::default();
        let gain = policy.projected_gain(20.0, 150, StudyMode::Flip);
        assert_eq!(gain, policy.compute(20.0, 150, StudyMode::Flip) - 20.0);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        let policy = MasteryPolicy::default();
        assert_eq!(policy.compute(-10.0, 0, StudyMode::Flip), 0.0);
        assert_eq!(policy.compute(150.0, 60, StudyMode::Quiz), 100.0);
    }
}
