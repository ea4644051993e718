use super::*;
use crate::foundation::core::PropertyType;
use crate::foundation::error::CuegenError;
use crate::protocol::config::TriggerBindings;
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
            PropertyDescriptor::new("In", PropertyType::Trigger, None),
            PropertyDescriptor::new("Out", PropertyType::Trigger, None),
        ],
    )
    .unwrap()
}

fn fixture() -> MemoryModel {
    MemoryModel::new()
        .string("Title", "Hello")
        .number("Score", 0.0)
        .trigger("In")
        .trigger("Out")
}

fn config() -> ControllerConfig {
    ControllerConfig {
        triggers: TriggerBindings {
            enter: Some("In".to_string()),
            exit: Some("Out".to_string()),
            advance: None,
        },
        ..ControllerConfig::default()
    }
}

fn title_at_enter(model: &MemoryModel) -> Option<serde_json::Value> {
    let mut title = None;
    for entry in model.journal() {
        match entry {
            JournalEntry::Set { name, value } if name == "Title" => title = Some(value),
            JournalEntry::Fire { name } if name == "In" => return title,
            _ => {}
        }
    }
    None
}

#[test]
fn updates_while_unbound_apply_in_arrival_order() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.update(&Payload::from(r#"{"Title":"U1","Score":1}"#));
    c.update(&Payload::from(r#"{"title":"U2"}"#));
    assert_eq!(c.state(), LifecycleState::Unbound);
    assert_eq!(c.pending_len(), 2);

    c.bind(Box::new(model.instance()));

    assert!(c.is_ready());
    assert_eq!(c.pending_len(), 0);
    assert_eq!(model.value("Title"), Some(json!("U2")));
    assert_eq!(model.value("Score"), Some(json!(1.0)));
}

#[test]
fn baked_defaults_then_boot_values_then_queue() {
    let model = fixture();
    let mut cfg = config();
    cfg.baked_defaults.insert("Title".to_string(), "Baked".to_string());
    cfg.baked_defaults.insert("Score".to_string(), "5".to_string());
    let boot = [("Title", "Boot"), ("score", "9")];
    let mut c = Controller::new(&schema(), cfg).with_boot_values(boot);
    c.update(&Payload::from(r#"{"Score":"7"}"#));
    c.bind(Box::new(model.instance()));

    let sets: Vec<_> = model
        .journal()
        .into_iter()
        .filter_map(|e| match e {
            JournalEntry::Set { name, value } => Some((name, value)),
            _ => None,
        })
        .collect();
    assert_eq!(
        sets,
        vec![
            ("Score".to_string(), json!(5.0)),
            ("Title".to_string(), json!("Baked")),
            ("Title".to_string(), json!("Boot")),
            ("Score".to_string(), json!(7.0)),
        ]
    );
}

#[test]
fn first_play_without_data_waits_for_the_window() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.bind(Box::new(model.instance()));

    c.play();
    assert!(c.has_deferred_play());
    c.advance_by(149);
    assert!(!model.is_playing());

    c.advance_by(1);
    assert!(model.is_playing());
    assert_eq!(model.fire_count("In"), 1);
    assert_eq!(title_at_enter(&model), None);
    assert_eq!(model.value("Title"), Some(json!("Hello")));
}

#[test]
fn update_inside_window_is_visible_when_enter_fires() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.bind(Box::new(model.instance()));

    c.play();
    c.advance_by(40);
    c.update(&Payload::from(r#"{"Title":"World"}"#));

    assert!(!c.has_deferred_play());
    assert!(model.is_playing());
    assert_eq!(c.now(), 40);
    assert_eq!(title_at_enter(&model), Some(json!("World")));

    c.advance_by(500);
    assert_eq!(model.fire_count("In"), 1);
}

#[test]
fn zero_grace_or_prior_data_plays_immediately() {
    let model = fixture();
    let mut cfg = config();
    cfg.first_play_grace_ms = 0;
    let mut c = Controller::new(&schema(), cfg);
    c.bind(Box::new(model.instance()));
    c.play();
    assert!(model.is_playing());

    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.bind(Box::new(model.instance()));
    c.update(&Payload::from(r#"{"Title":"x"}"#));
    c.play();
    assert!(model.is_playing());
}

#[test]
fn play_before_load_runs_after_the_drain() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.update(&Payload::from(r#"{"Title":"Queued"}"#));
    c.play();
    assert!(!c.has_deferred_play());
    c.bind(Box::new(model.instance()));

    assert!(model.is_playing());
    assert_eq!(title_at_enter(&model), Some(json!("Queued")));
}

#[test]
fn stop_fires_exit_or_falls_back_to_native_stop() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.bind(Box::new(model.instance()));
    c.update(&Payload::from("{}"));
    c.play();
    c.stop();
    assert_eq!(model.fire_count("Out"), 1);
    c.stop();
    assert_eq!(model.fire_count("Out"), 1);

    let model = fixture();
    let mut cfg = config();
    cfg.triggers.exit = Some("Missing".to_string());
    let mut c = Controller::new(&schema(), cfg);
    c.bind(Box::new(model.instance()));
    c.update(&Payload::from(r#"{"Score":1}"#));
    c.play();
    c.stop();
    assert!(!model.is_playing());
    assert!(model.journal().contains(&JournalEntry::Stop));
}

#[test]
fn stop_before_playback_only_cancels_the_pending_play() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.bind(Box::new(model.instance()));
    c.stop();
    assert_eq!(model.fire_count("Out"), 0);
    assert!(!model.journal().contains(&JournalEntry::Stop));

    c.play();
    assert!(c.has_deferred_play());
    c.stop();
    assert!(!c.has_deferred_play());
    c.advance_by(1_000);
    assert!(!model.is_playing());
    assert_eq!(model.fire_count("In"), 0);
    assert_eq!(model.fire_count("Out"), 0);
    assert!(!model.journal().contains(&JournalEntry::Stop));
}

#[test]
fn remove_is_idempotent_and_terminal() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.bind(Box::new(model.instance()));
    c.remove();
    c.remove();
    c.teardown();
    assert_eq!(c.state(), LifecycleState::Released);
    assert_eq!(model.cleanup_count(), 1);

    c.update(&Payload::from(r#"{"Title":"late"}"#));
    c.play();
    c.stop();
    c.advance();
    c.advance_by(1_000);
    assert_eq!(model.value("Title"), Some(json!("Hello")));
}

#[test]
fn instance_bound_after_release_is_cleaned_up() {
    let model = fixture();
    let mut c = Controller::new(&schema(), config());
    c.play();
    c.remove();
    c.bind(Box::new(model.instance()));
    assert_eq!(c.state(), LifecycleState::Released);
    assert_eq!(model.cleanup_count(), 1);
    assert!(!model.is_playing());
}

#[test]
fn failed_load_leaves_the_controller_unbound() {
    let mut c = Controller::new(&schema(), config());
    c.update(&Payload::from(r#"{"Title":"kept"}"#));
    let failed = async { Err::<Box<dyn LiveInstance>, _>(CuegenError::load("truncated source")) };
    pollster::block_on(c.bind_when_loaded(failed));
    assert_eq!(c.state(), LifecycleState::Unbound);
    assert_eq!(c.pending_len(), 1);

    let model = fixture();
    let instance: Box<dyn LiveInstance> = Box::new(model.instance());
    pollster::block_on(c.bind_when_loaded(async move { Ok::<_, CuegenError>(instance) }));
    assert_eq!(c.state(), LifecycleState::Bound);
    assert_eq!(model.value("Title"), Some(json!("kept")));
}

#[test]
fn unparsable_updates_are_discarded() {
    let mut c = Controller::new(&schema(), config());
    c.update(&Payload::from("not a payload"));
    assert_eq!(c.updates_received(), 0);
    assert_eq!(c.pending_len(), 0);
}
