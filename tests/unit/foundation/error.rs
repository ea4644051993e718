use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(CuegenError::load("x").to_string().contains("load error:"));
    assert!(CuegenError::parse("x").to_string().contains("parse error:"));
    assert!(
        CuegenError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(CuegenError::render("x").to_string().contains("render error:"));
    assert!(
        CuegenError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn property_write_names_the_property() {
    let err = CuegenError::property_write("Title", "slot is read-only");
    let msg = err.to_string();
    assert!(msg.contains("'Title'"));
    assert!(msg.contains("slot is read-only"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CuegenError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_convert() {
    let err: CuegenError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, CuegenError::Serde(_)));
}
