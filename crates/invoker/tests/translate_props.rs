//! Property-based tests for argument translation.
//!
//! - Determinism: translating the same tokens twice gives equal results
//! - Unknown dash-prefixed tokens are forwarded, never taken as goals
//! - Plain tokens are goals, in order
//! - `-D` values keep everything after the first `=`

use mavenkit_invoker::translate;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("-P".to_string()),
        Just("-pl".to_string()),
        Just("-s".to_string()),
        Just("-T".to_string()),
        Just("-rf".to_string()),
        Just("-q".to_string()),
        Just("-fae".to_string()),
        Just("-ff".to_string()),
        Just(String::new()),
        "-D[a-z]{1,5}(=[a-z=]{0,5})?".prop_map(String::from),
        "-P[a-z,]{0,8}".prop_map(String::from),
        "[a-z:]{1,12}".prop_map(String::from),
        "-[A-Z]{2,4}".prop_map(String::from),
    ]
}

fn goal_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z:-]{0,12}".prop_map(String::from)
}

proptest! {
    #[test]
    fn translation_is_deterministic(tokens in prop::collection::vec(token_strategy(), 0..12)) {
        prop_assert_eq!(translate(&tokens), translate(&tokens));
    }

    #[test]
    fn unknown_flags_are_forwarded(flag in "-[A-Z]{2,4}", goal in goal_strategy()) {
        // Upper-case runs starting with D, P or T are value flags.
        prop_assume!(!flag.starts_with("-D") && !flag.starts_with("-P") && !flag.starts_with("-T"));
        let parsed = translate(&[flag.clone(), goal.clone()]);
        prop_assert_eq!(parsed.additional_args, vec![flag]);
        prop_assert_eq!(parsed.goals, vec![goal]);
    }

    #[test]
    fn goals_keep_order(goals in prop::collection::vec(goal_strategy(), 0..8)) {
        let parsed = translate(&goals);
        prop_assert_eq!(parsed.goals, goals);
    }

    #[test]
    fn property_value_keeps_later_equals(key in "[a-z]{1,6}", value in "[a-z=]{0,8}") {
        let parsed = translate(&[format!("-D{key}={value}")]);
        prop_assert_eq!(parsed.properties.get(&key), Some(&value));
    }
}
