use super::*;
use crate::foundation::core::{Argb, PropertyValue};
use crate::runtime::manifest::ManifestRuntime;
use crate::runtime::memory::MemoryModel;
use crate::runtime::{ArtboardInfo, StateMachineInfo};
use serde_json::json;

struct FixedRuntime {
    layout: FileLayout,
    model: MemoryModel,
}

impl AnimationRuntime for FixedRuntime {
    fn inspect(&self, _source: &[u8]) -> CuegenResult<FileLayout> {
        Ok(self.layout.clone())
    }

    fn instantiate(
        &self,
        _source: &[u8],
        _request: &InstanceRequest<'_>,
    ) -> CuegenResult<Box<dyn LiveInstance>> {
        Ok(Box::new(self.model.instance()))
    }
}

fn layout() -> FileLayout {
    FileLayout {
        artboards: vec![
            ArtboardInfo {
                name: "Main".to_string(),
                state_machines: vec![
                    StateMachineInfo {
                        name: "SM1".to_string(),
                    },
                    StateMachineInfo {
                        name: "SM2".to_string(),
                    },
                ],
            },
            ArtboardInfo {
                name: "Alt".to_string(),
                state_machines: vec![],
            },
        ],
    }
}

#[test]
fn selection_falls_back_to_first_available() {
    let l = layout();
    assert_eq!(
        resolve_selection(&l, None, None).unwrap(),
        ("Main".to_string(), Some("SM1".to_string()))
    );
    assert_eq!(
        resolve_selection(&l, Some("Missing"), Some("SM2")).unwrap(),
        ("Main".to_string(), Some("SM2".to_string()))
    );
    assert_eq!(
        resolve_selection(&l, Some("Main"), Some("Nope")).unwrap(),
        ("Main".to_string(), Some("SM1".to_string()))
    );
    assert_eq!(
        resolve_selection(&l, Some("Alt"), Some("SM1")).unwrap(),
        ("Alt".to_string(), None)
    );
}

#[test]
fn empty_layout_is_a_load_error() {
    let err = resolve_selection(&FileLayout::default(), None, None).unwrap_err();
    assert!(matches!(err, CuegenError::Load(_)));
}

#[test]
fn reads_defaults_through_typed_accessors_and_releases_instance() {
    let model = MemoryModel::new()
        .string("Title", "Hello")
        .with("Live", PropertyType::Boolean, json!("yes"))
        .with("Accent", PropertyType::Color, json!("#FF8800"))
        .number("Score", 7.0)
        .trigger("In");
    let ex = SchemaExtractor::new(FixedRuntime {
        layout: layout(),
        model: model.clone(),
    });

    let schema = ex.build_schema(b"", None, None).unwrap();
    assert_eq!(schema.artboard(), "Main");
    assert_eq!(schema.state_machine(), "SM1");
    assert_eq!(
        schema.property("Live").unwrap().default_value,
        Some(PropertyValue::Boolean(true))
    );
    assert_eq!(
        schema.property("Accent").unwrap().default_value,
        Some(PropertyValue::Color(Argb(0xFFFF_8800)))
    );
    assert_eq!(schema.property("In").unwrap().default_value, None);
    assert_eq!(model.cleanup_count(), 1);
}

#[test]
fn releases_instance_when_extraction_fails() {
    let model = MemoryModel::new()
        .string("Title", "a")
        .string("Title", "b");
    let ex = SchemaExtractor::new(FixedRuntime {
        layout: layout(),
        model: model.clone(),
    });

    assert!(ex.build_schema(b"", Some("Main"), None).is_err());
    assert_eq!(model.cleanup_count(), 1);
}

#[test]
fn unreadable_default_becomes_none() {
    let model = MemoryModel::new().string("Title", "a").number("Score", 1.0);
    model.fail_accessor("Score");
    let ex = SchemaExtractor::new(FixedRuntime {
        layout: layout(),
        model,
    });

    let schema = ex.build_schema(b"", None, None).unwrap();
    assert_eq!(schema.property("Score").unwrap().default_value, None);
    assert!(schema.property("Title").unwrap().default_value.is_some());
}

#[test]
fn manifest_source_round_trips_through_extractor() {
    let manifest = br##"{
        "artboards": [{
            "name": "Scorebug",
            "stateMachines": ["Main"],
            "viewModel": [
                { "name": "Home", "type": "string", "value": "HOME" },
                { "name": "Tint", "type": "color", "value": 4278190335 }
            ]
        }]
    }"##;
    let ex = SchemaExtractor::new(ManifestRuntime);
    let layout = ex.inspect(manifest).unwrap();
    assert_eq!(layout.artboards[0].name, "Scorebug");

    let schema = ex.build_schema(manifest, Some("Scorebug"), Some("Main")).unwrap();
    assert_eq!(
        schema.property("Tint").unwrap().default_value,
        Some(PropertyValue::Color(Argb(0xFF00_00FF)))
    );
}

#[test]
fn unparsable_source_fails_with_load_error() {
    let ex = SchemaExtractor::new(ManifestRuntime);
    let err = ex.build_schema(b"RIVE\x07\x00", None, None).unwrap_err();
    assert!(matches!(err, CuegenError::Load(_)));
}
