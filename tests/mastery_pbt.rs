//! Property-based tests for the mastery gain curve.

use proptest::prelude::*;

use flashdeck_backend::services::mastery::{
    MasteryPolicy, StudyMode, FLIP_MODE_CAP, MASTERY_MAX, MASTERY_MIN,
};

fn any_mode() -> impl Strategy<Value = StudyMode> {
    prop_oneof![
        Just(StudyMode::Flip),
        Just(StudyMode::Quiz),
        Just(StudyMode::AdaptiveQuiz),
    ]
}

proptest! {
    #[test]
    fn result_stays_in_mastery_range(
        initial in MASTERY_MIN..=MASTERY_MAX,
        seconds in 0u64..1_000_000,
        mode in any_mode(),
    ) {
        let policy = MasteryPolicy::default();
        let result = policy.compute(initial, seconds, mode);
        prop_assert!(result >= MASTERY_MIN);
        prop_assert!(result <= MASTERY_MAX);
    }

    #[test]
    fn mastery_never_decreases(
        initial in MASTERY_MIN..=MASTERY_MAX,
        seconds in 0u64..1_000_000,
        mode in any_mode(),
    ) {
        let policy = MasteryPolicy::default();
        let result = policy.compute(initial, seconds, mode);
        prop_assert!(result >= initial);
    }

    #[test]
    fn more_time_never_yields_less_mastery(
        initial in MASTERY_MIN..=MASTERY_MAX,
        seconds in 0u64..500_000,
        extra in 0u64..500_000,
        mode in any_mode(),
    ) {
        let policy = MasteryPolicy::default();
        let shorter = policy.compute(initial, seconds, mode);
        let longer = policy.compute(initial, seconds + extra, mode);
        prop_assert!(longer >= shorter);
    }

    #[test]
    fn under_a_minute_changes_nothing(
        initial in MASTERY_MIN..=MASTERY_MAX,
        seconds in 0u64..60,
        mode in any_mode(),
    ) {
        let policy = MasteryPolicy::default();
        prop_assert_eq!(policy.compute(initial, seconds, mode), initial);
    }

    #[test]
    fn flip_mode_never_exceeds_its_cap(
        initial in MASTERY_MIN..=FLIP_MODE_CAP,
        seconds in 0u64..1_000_000,
    ) {
        let policy = MasteryPolicy::default();
        let result = policy.compute(initial, seconds, StudyMode::Flip);
        prop_assert!(result <= FLIP_MODE_CAP);
    }

    #[test]
    fn flip_mode_leaves_high_mastery_untouched(
        initial in FLIP_MODE_CAP..=MASTERY_MAX,
        seconds in 0u64..1_000_000,
    ) {
        let policy = MasteryPolicy::default();
        prop_assert_eq!(policy.compute(initial, seconds, StudyMode::Flip), initial);
    }

    #[test]
    fn projected_gain_matches_compute(
        initial in MASTERY_MIN..=MASTERY_MAX,
        seconds in 0u64..1_000_000,
        mode in any_mode(),
    ) {
        let policy = MasteryPolicy::default();
        let gain = policy.projected_gain(initial, seconds, mode);
        let result = policy.compute(initial, seconds, mode);
        prop_assert!(gain >= 0.0);
        prop_assert!((initial + gain - result).abs() < 1e-9);
    }

    #[test]
    fn compute_is_deterministic(
        initial in MASTERY_MIN..=MASTERY_MAX,
        seconds in 0u64..1_000_000,
        mode in any_mode(),
    ) {
        let policy = MasteryPolicy::default();
        prop_assert_eq!(
            policy.compute(initial, seconds, mode),
            policy.compute(initial, seconds, mode)
        );
    }
}
