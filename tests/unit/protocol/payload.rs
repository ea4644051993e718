use super::*;
use serde_json::json;

fn expected() -> FlatPayload {
    [("Name", "Value")].into_iter().collect()
}

#[test]
fn every_encoding_yields_the_same_flat_mapping() {
    let encodings = [
        Payload::from(r#"{"Name":"Value"}"#),
        Payload::from(r#"{"templateData":[{"id":"Name","value":"Value"}]}"#),
        Payload::from(r#"{"templatedata":[{"id":"Name","data":{"text":"Value"}}]}"#),
        Payload::from(r#"'{"Name":"Value"}'"#),
        Payload::from("{\"Name\" : \n \"Value\",,}"),
        Payload::from(
            r#"<templateData><componentData id="Name"><data id="text" value="Value"/></componentData></templateData>"#,
        ),
        Payload::from("\u{FEFF}  <componentdata id=\"Name\"><data value=\"Value\"/></componentdata>"),
        Payload::from(json!({"Name": "Value"})),
        Payload::from(json!(r#"{"Name":"Value"}"#)),
    ];
    for p in &encodings {
        assert_eq!(normalize(p).unwrap(), expected(), "{p:?}");
    }
}

#[test]
fn templatedata_values_are_stringified() {
    let flat = normalize(&Payload::from(json!({
        "templateData": [
            { "id": "Score", "value": 3 },
            { "id": "Live", "data": { "value": true } },
            { "value": "orphan" }
        ]
    })))
    .unwrap();
    assert_eq!(flat.get("Score").unwrap(), "3");
    assert_eq!(flat.get("Live").unwrap(), "true");
    assert_eq!(flat.len(), 2);
}

#[test]
fn flat_objects_keep_native_values() {
    let flat = normalize(&Payload::from(r#"{"Score": 3, "Live": true}"#)).unwrap();
    assert_eq!(flat.get("Score"), Some(&json!(3)));
    assert_eq!(flat.get("Live"), Some(&json!(true)));
}

#[test]
fn literal_newlines_inside_values_are_recovered() {
    let flat = normalize(&Payload::from("{\"Title\":\"Line 1\nLine 2\"}")).unwrap();
    assert_eq!(flat.get("Title").unwrap(), "Line 1\nLine 2");
}

#[test]
fn unrecoverable_payloads_are_parse_errors() {
    for bad in ["", "   ", "hello world", "[1, 2, 3]", "42"] {
        let err = normalize(&Payload::from(bad)).unwrap_err();
        assert!(matches!(err, CuegenError::Parse(_)), "{bad:?}: {err}");
    }
    let err = normalize(&Payload::from(json!(["a"]))).unwrap_err();
    assert!(matches!(err, CuegenError::Parse(_)));
}

#[test]
fn double_encoded_strings_unwrap_only_once() {
    let inner = serde_json::to_string(r#"{"A":"b"}"#).unwrap();
    let twice = serde_json::to_string(&inner).unwrap();
    assert!(normalize(&Payload::from(inner.as_str())).is_ok());
    assert!(normalize(&Payload::from(twice.as_str())).is_err());
}

#[test]
fn keys_keep_arrival_order() {
    let flat = normalize(&Payload::from(r##"{"title":"a","In":"true","Accent":"#fff"}"##)).unwrap();
    let keys: Vec<_> = flat.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["title", "In", "Accent"]);

    let xml = r#"<templateData>
        <componentData id="Zeta"><data value="1"/></componentData>
        <componentData id="Alpha"><data value="2"/></componentData>
    </templateData>"#;
    let keys: Vec<_> = normalize(&Payload::from(xml))
        .unwrap()
        .iter()
        .map(|(k, _)| k.to_string())
        .collect();
    assert_eq!(keys, ["Zeta", "Alpha"]);
}
