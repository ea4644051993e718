use super::*;
use crate::foundation::core::Argb;

const SCHEMA_JSON: &str = r##"{
  "artboard": "Lower Third",
  "stateMachine": "Main",
  "viewModelProps": [
    { "name": "Title", "type": "string", "value": "Hello" },
    { "name": "Score", "type": "number", "value": 3 },
    { "name": "Live", "type": "boolean", "value": "yes" },
    { "name": "Accent", "type": "color", "value": "#FF8800" },
    { "name": "In", "type": "trigger", "value": null },
    { "name": "Logo", "type": "image" }
  ]
}"##;

#[test]
fn parses_schema_json_with_typed_defaults() {
    let s = Schema::from_json_str(SCHEMA_JSON).unwrap();
    assert_eq!(s.artboard(), "Lower Third");
    assert_eq!(s.state_machine(), "Main");
    assert_eq!(s.properties().len(), 6);
    assert_eq!(
        s.property("Title").unwrap().default_value,
        Some(PropertyValue::String("Hello".to_string()))
    );
    assert_eq!(
        s.property("Live").unwrap().default_value,
        Some(PropertyValue::Boolean(true))
    );
    assert_eq!(
        s.property("Accent").unwrap().default_value,
        Some(PropertyValue::Color(Argb(0xFFFF_8800)))
    );
    assert_eq!(s.property("In").unwrap().default_value, None);
    assert_eq!(s.property("Logo").unwrap().ty, PropertyType::Image);
    assert!(s.property("title").is_none());
}

#[test]
fn serializes_colors_as_unsigned_integers() {
    let s = Schema::from_json_str(SCHEMA_JSON).unwrap();
    let v: Value = serde_json::from_str(&s.to_json_pretty().unwrap()).unwrap();
    assert_eq!(v["stateMachine"], "Main");
    assert_eq!(v["viewModelProps"][3]["value"], 0xFFFF_8800u32);
    assert_eq!(v["viewModelProps"][4]["value"], Value::Null);

    let back = Schema::from_json_str(&s.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, s);
}

#[test]
fn rejects_duplicate_names_but_allows_case_variants() {
    let dup = Schema::new(
        "A",
        "",
        vec![
            PropertyDescriptor::new("Title", PropertyType::String, None),
            PropertyDescriptor::new("Title", PropertyType::Number, None),
        ],
    );
    assert!(dup.is_err());

    let variants = Schema::new(
        "A",
        "",
        vec![
            PropertyDescriptor::new("Title", PropertyType::String, None),
            PropertyDescriptor::new("title", PropertyType::String, None),
        ],
    );
    assert!(variants.is_ok());
}

#[test]
fn unknown_type_is_a_validation_error() {
    let err = Schema::from_json_str(
        r#"{"artboard":"A","viewModelProps":[{"name":"x","type":"enum"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, CuegenError::Validation(_)));
}
