//! Unit tests for the Origin Resolver.
//!
//! Origins are compared structurally: scheme, host and port matter; path,
//! query and fragment do not.

use pagefreeze::services::origin_resolver::{resolve, resolve_or_log};
use pagefreeze::types::errors::OriginError;
use rstest::rstest;

#[test]
fn test_path_and_query_are_irrelevant() {
    assert_eq!(
        resolve("https://a.com/x?y=1").unwrap(),
        resolve("https://a.com/z").unwrap()
    );
}

#[test]
fn test_explicit_port_is_distinct() {
    assert_ne!(
        resolve("https://a.com/x?y=1").unwrap(),
        resolve("https://a.com:8443/x").unwrap()
    );
}

#[test]
fn test_scheme_is_distinct() {
    assert_ne!(
        resolve("https://a.com/x").unwrap(),
        resolve("http://a.com/x").unwrap()
    );
}

#[test]
fn test_substring_lookalike_is_distinct() {
    assert_ne!(
        resolve("https://a.example/x").unwrap(),
        resolve("https://a.example.evil.com/x").unwrap()
    );
}

#[rstest]
#[case("https://a.example:8443/x#frag", "https://a.example:8443")]
#[case("https://a.example/x", "https://a.example")]
#[case("http://localhost:3000/app", "http://localhost:3000")]
#[case("https://user:pw@a.com/", "https://a.com")]
#[case("http://[::1]:8080/", "http://[::1]:8080")]
fn test_serialized_origin(#[case] url: &str, #[case] expected: &str) {
    assert_eq!(resolve(url).unwrap().as_str(), expected);
}

#[rstest]
#[case("not a url")]
#[case("")]
#[case("https://")]
#[case("//a.com/relative")]
fn test_unparseable_input_is_invalid(#[case] url: &str) {
    assert!(matches!(resolve(url), Err(OriginError::InvalidUrl(_))));
}

#[rstest]
#[case("about:blank")]
#[case("data:text/html,<p>hi</p>")]
#[case("javascript:void(0)")]
fn test_opaque_origins_are_rejected(#[case] url: &str) {
    assert!(matches!(resolve(url), Err(OriginError::OpaqueOrigin(_))));
}

#[test]
fn test_resolve_or_log_fails_open_to_none() {
    assert!(resolve_or_log("::::").is_none());
    assert!(resolve_or_log("https://a.com/").is_some());
}
