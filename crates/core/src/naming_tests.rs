use super::*;
use proptest::prelude::*;

#[test]
fn sanitize_lowercases_and_collapses_runs() {
    assert_eq!(sanitize("My Project!!Name"), "my-project-name");
}

#[test]
fn sanitize_strips_leading_and_trailing_dashes() {
    assert_eq!(sanitize("--hello--"), "hello");
}

#[test]
fn sanitize_empty_falls_back_to_default() {
    assert_eq!(sanitize(""), DEFAULT_PREFIX);
    assert_eq!(sanitize("!!!"), DEFAULT_PREFIX);
}

#[test]
fn sanitize_is_idempotent() {
    let cases = ["My Project!!Name", "", "already-sane", "___", "a.b.c"];
    for s in cases {
        let once = sanitize(s);
        let twice = sanitize(&once);
        assert_eq!(once, twice, "not idempotent for {s:?}");
    }
}

#[test]
fn build_name_matches_literal_scenario() {
    // scenario 1 from the routing/hook scenario table: prefix=oc,
    // projectId sanitises to abcdef1234..., sessionId=sess-ROOT-xyz.
    let name = build_name("oc", "abcdef1234567890", "sess-ROOT-xyz");
    assert_eq!(name, "oc-abcdef12-sess");
}

#[test]
fn build_name_is_deterministic() {
    let a = build_name("oc", "proj", "sess-1");
    let b = build_name("oc", "proj", "sess-1");
    assert_eq!(a, b);
}

proptest! {
    #[test]
    fn sanitize_output_matches_allowed_alphabet(s in ".{0,40}") {
        let out = sanitize(&s);
        prop_assert!(!out.is_empty());
        prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'));
        prop_assert!(!out.starts_with('-'));
        prop_assert!(!out.ends_with('-'));
    }

    #[test]
    fn sanitize_is_idempotent_prop(s in ".{0,40}") {
        let once = sanitize(&s);
        let twice = sanitize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn build_name_stable_under_equal_sanitization(
        prefix in "[a-zA-Z]{1,6}",
        project in "[a-zA-Z0-9]{4,12}",
        session in "[a-zA-Z0-9]{4,12}",
    ) {
        let a = build_name(&prefix, &project, &session);
        let b = build_name(&prefix.to_ascii_uppercase(), &project, &session);
        prop_assert_eq!(a, b);
    }
}
