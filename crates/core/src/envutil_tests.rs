use super::*;

#[test]
fn env_bool_recognizes_true_and_false_tokens() {
    std::env::set_var("LOOM_TEST_ENV_BOOL_A", "YES");
    assert!(env_bool("LOOM_TEST_ENV_BOOL_A", false));
    std::env::set_var("LOOM_TEST_ENV_BOOL_A", "off");
    assert!(!env_bool("LOOM_TEST_ENV_BOOL_A", true));
    std::env::remove_var("LOOM_TEST_ENV_BOOL_A");
}

#[test]
fn env_bool_falls_back_to_default_on_garbage() {
    std::env::set_var("LOOM_TEST_ENV_BOOL_B", "maybe");
    assert!(env_bool("LOOM_TEST_ENV_BOOL_B", true));
    std::env::remove_var("LOOM_TEST_ENV_BOOL_B");
}

#[test]
fn env_bool_missing_uses_default() {
    std::env::remove_var("LOOM_TEST_ENV_BOOL_C");
    assert!(!env_bool("LOOM_TEST_ENV_BOOL_C", false));
}

#[test]
fn env_int_and_float_parse_or_default() {
    std::env::set_var("LOOM_TEST_ENV_INT", "42");
    assert_eq!(env_int("LOOM_TEST_ENV_INT", 0), 42);
    std::env::set_var("LOOM_TEST_ENV_INT", "not-a-number");
    assert_eq!(env_int("LOOM_TEST_ENV_INT", 7), 7);
    std::env::remove_var("LOOM_TEST_ENV_INT");

    std::env::set_var("LOOM_TEST_ENV_FLOAT", "1.5");
    assert!((env_float("LOOM_TEST_ENV_FLOAT", 0.0) - 1.5).abs() < f64::EPSILON);
    std::env::remove_var("LOOM_TEST_ENV_FLOAT");
}

#[test]
fn env_list_splits_and_trims() {
    std::env::set_var("LOOM_TEST_ENV_LIST", " a, b ,, c");
    assert_eq!(
        env_list("LOOM_TEST_ENV_LIST", ",", vec![]),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    std::env::remove_var("LOOM_TEST_ENV_LIST");
    assert_eq!(
        env_list("LOOM_TEST_ENV_LIST", ",", vec!["fallback".to_string()]),
        vec!["fallback".to_string()]
    );
}
