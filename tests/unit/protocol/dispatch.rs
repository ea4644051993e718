use super::*;
use crate::protocol::payload::{Payload, normalize};
use crate::runtime::memory::{JournalEntry, MemoryModel};
use crate::schema::model::PropertyDescriptor;
use serde_json::json;

fn schema() -> Schema {
    Schema::new(
        "Main",
        "SM",
        vec![
            PropertyDescriptor::new("Title", PropertyType::String, None),
            PropertyDescriptor::new("Score", PropertyType::Number, None),
            PropertyDescriptor::new("Live", PropertyType::Boolean, None),
            PropertyDescriptor::new("Accent", PropertyType::Color, None),
            PropertyDescriptor::new("In", PropertyType::Trigger, None),
        ],
    )
    .unwrap()
}

fn model() -> MemoryModel {
    MemoryModel::new()
        .string("Title", "")
        .number("Score", 0.0)
        .boolean("Live", false)
        .color("Accent", 0xFF00_0000)
        .trigger("In")
}

fn flat(v: serde_json::Value) -> FlatPayload {
    v.as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[test]
fn keys_resolve_case_insensitively_and_use_declared_types() {
    let model = model();
    let mut vm = model.view_model();
    let report = Dispatcher::from_schema(&schema()).apply(
        &mut vm,
        &flat(json!({
            "title": "World",
            "SCORE": "12.5",
            "live": "yes",
            "accent": "#FF8800",
            "in": "true"
        })),
    );

    assert_eq!(model.value("Title"), Some(json!("World")));
    assert_eq!(model.value("Score"), Some(json!(12.5)));
    assert_eq!(model.value("Live"), Some(json!(true)));
    assert_eq!(model.value("Accent"), Some(json!(0xFFFF_8800u32)));
    assert_eq!(model.fire_count("In"), 1);
    assert_eq!(report.fired, vec!["In".to_string()]);
    assert_eq!(report.applied.len(), 4);
}

#[test]
fn rejected_values_leave_properties_untouched() {
    let model = model();
    let mut vm = model.view_model();
    let report = Dispatcher::from_schema(&schema()).apply(
        &mut vm,
        &flat(json!({ "Score": "lots", "Accent": "teal", "In": "false" })),
    );

    assert_eq!(model.value("Score"), Some(json!(0.0)));
    assert_eq!(model.value("Accent"), Some(json!(0xFF00_0000u32)));
    assert_eq!(model.fire_count("In"), 0);
    assert_eq!(report.skipped.len(), 3);
    assert!(!report.touched_anything());
}

#[test]
fn one_failing_accessor_does_not_abort_siblings() {
    let model = model();
    model.fail_accessor("Score");
    let mut vm = model.view_model();
    let report = Dispatcher::from_schema(&schema()).apply(
        &mut vm,
        &flat(json!({ "Score": 3, "Title": "ok", "Live": 1 })),
    );

    assert_eq!(report.failed, vec!["Score".to_string()]);
    assert_eq!(model.value("Title"), Some(json!("ok")));
    assert_eq!(model.value("Live"), Some(json!(true)));
}

#[test]
fn unresolved_keys_probe_accessors_in_priority_order() {
    // "Extra" exists on the instance but not in the schema snapshot.
    let model = model().number("Extra", 0.0).trigger("Pulse");
    let mut vm = model.view_model();
    let report = Dispatcher::from_schema(&schema()).apply(
        &mut vm,
        &flat(json!({ "Extra": "4", "Pulse": true, "Ghost": "boo" })),
    );

    assert_eq!(model.value("Extra"), Some(json!(4.0)));
    assert_eq!(model.fire_count("Pulse"), 1);
    assert_eq!(report.skipped, vec!["Ghost".to_string()]);
}

#[test]
fn probe_skips_failing_accessor_and_keeps_literal_key() {
    let model = model().string("extra", "");
    model.fail_accessor("extra");
    let mut vm = model.view_model();
    let report = Dispatcher::from_schema(&schema())
        .apply(&mut vm, &flat(json!({ "extra": "x" })));
    assert_eq!(report.skipped, vec!["extra".to_string()]);
    assert!(model.journal().is_empty());
}

#[test]
fn image_properties_decode_or_clear() {
    let schema = Schema::new(
        "Main",
        "",
        vec![PropertyDescriptor::new("Logo", PropertyType::Image, None)],
    )
    .unwrap();
    let model = MemoryModel::new().image("Logo");
    let mut vm = model.view_model();
    let d = Dispatcher::from_schema(&schema);

    d.apply(&mut vm, &flat(json!({ "logo": "https://cdn.example/l.png" })));
    d.apply(&mut vm, &flat(json!({ "Logo": "none" })));
    let report = d.apply(&mut vm, &flat(json!({ "Logo": "b64:@@@" })));

    assert_eq!(report.failed, vec!["Logo".to_string()]);
    assert_eq!(
        model.journal(),
        vec![
            JournalEntry::Image {
                name: "Logo".to_string(),
                request: crate::runtime::ImageRequest::Remote(
                    "https://cdn.example/l.png".to_string()
                ),
            },
            JournalEntry::Image {
                name: "Logo".to_string(),
                request: crate::runtime::ImageRequest::Clear,
            },
        ]
    );
}

#[test]
fn entries_apply_in_the_order_the_host_sent_them() {
    let model = model();
    let mut vm = model.view_model();
    let payload =
        normalize(&Payload::from(r#"{"title":"Breaking","In":"true","score":3}"#)).unwrap();
    Dispatcher::from_schema(&schema()).apply(&mut vm, &payload);

    assert_eq!(
        model.journal(),
        vec![
            JournalEntry::Set {
                name: "Title".to_string(),
                value: json!("Breaking"),
            },
            JournalEntry::Fire {
                name: "In".to_string(),
            },
            JournalEntry::Set {
                name: "Score".to_string(),
                value: json!(3.0),
            },
        ]
    );
}
