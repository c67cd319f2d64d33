//! Unit tests for plugin identity validation.

use rstest::rstest;

use super::*;

#[test]
fn accessors_return_fields() {
    let identity = PluginIdentity::new("org.example.eq", "2.0.1", "1.0.0").expect("valid");
    assert_eq!(identity.id(), "org.example.eq");
    assert_eq!(identity.version(), "2.0.1");
    assert_eq!(identity.minimum_host_version(), "1.0.0");
    assert_eq!(identity.to_string(), "org.example.eq 2.0.1");
}

#[rstest]
#[case::empty_id("", "1.0.0", "1.0.0", "plugin id")]
#[case::blank_id("   ", "1.0.0", "1.0.0", "plugin id")]
#[case::empty_version("org.example.eq", "", "1.0.0", "version")]
#[case::blank_minimum("org.example.eq", "1.0.0", "\t", "minimum host version")]
fn rejects_blank_fields(
    #[case] id: &str,
    #[case] version: &str,
    #[case] minimum: &str,
    #[case] field: &str,
) {
    let error = PluginIdentity::new(id, version, minimum).expect_err("blank field must fail");
    assert!(matches!(error, PluginError::InvalidPluginIdentity { .. }));
    assert!(
        error.to_string().contains(field),
        "expected '{field}' in: {error}"
    );
}
