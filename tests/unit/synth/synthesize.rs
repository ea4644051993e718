use super::*;
use crate::foundation::core::{Argb, PropertyType, PropertyValue};
use crate::protocol::config::{HostProfile, TriggerBindings};
use crate::schema::model::PropertyDescriptor;

fn schema() -> Schema {
    Schema::new(
        "Lower </script> Third",
        "SM",
        vec![
            PropertyDescriptor::new(
                "Title",
                PropertyType::String,
                Some(PropertyValue::String("Hello".to_string())),
            ),
            PropertyDescriptor::new(
                "Accent",
                PropertyType::Color,
                Some(PropertyValue::Color(Argb(0xFFFF_8800))),
            ),
            PropertyDescriptor::new("In", PropertyType::Trigger, None),
        ],
    )
    .unwrap()
}

#[test]
fn output_is_deterministic() {
    let opts = SynthOptions {
        trigger_bindings: TriggerBindings {
            enter: Some("In".to_string()),
            ..TriggerBindings::default()
        },
        ..SynthOptions::default()
    };
    let a = synthesize(&schema(), &opts).unwrap();
    let b = synthesize(&schema(), &opts).unwrap();
    assert_eq!(a, b);
}

#[test]
fn baked_schema_reads_back_unchanged() {
    let doc = synthesize(&schema(), &SynthOptions::default()).unwrap();
    assert_eq!(read_baked_schema(doc.as_str()).unwrap(), schema());
    assert!(read_baked_schema("<html></html>").is_err());
}

#[test]
fn artboard_names_cannot_break_out_of_scripts() {
    let doc = synthesize(&schema(), &SynthOptions::default()).unwrap();
    let text = doc.as_str();
    assert_eq!(text.matches("</script>").count(), 3);
    assert!(text.contains("<title>Lower &lt;&#x2f;script&gt; Third</title>"));
}

#[test]
fn profile_selects_the_command_surface() {
    let cg = synthesize(&schema(), &SynthOptions::default()).unwrap();
    assert!(cg.as_str().contains("SetData: guarded(update)"));
    assert!(!cg.as_str().contains("schedule(timers.startDelayMs"));

    let overlay = synthesize(
        &schema(),
        &SynthOptions {
            host_profile: HostProfile::StreamingOverlay,
            ..SynthOptions::default()
        },
    )
    .unwrap();
    assert!(overlay.as_str().contains("schedule(timers.startDelayMs"));
    assert!(!overlay.as_str().contains("SetData"));
    assert!(overlay.as_str().contains(r#""profile": "streaming-overlay""#));
}

#[test]
fn embedded_payload_replaces_the_external_path() {
    let mut opts = SynthOptions {
        external_path: Some("x.bin".to_string()),
        ..SynthOptions::default()
    };
    let external = synthesize(&schema(), &opts).unwrap();
    assert!(external.as_str().contains(r#""src": "x.bin""#));

    opts.embed_bytes(&[1, 2, 3]);
    let embedded = synthesize(&schema(), &opts).unwrap();
    assert!(embedded.as_str().contains(r#""base64": "AQID""#));
    assert!(!embedded.as_str().contains("x.bin"));
}

#[test]
fn embed_without_payload_is_rejected() {
    let opts = SynthOptions {
        embed_payload: true,
        ..SynthOptions::default()
    };
    let err = synthesize(&schema(), &opts).unwrap_err();
    assert!(matches!(err, CuegenError::Validation(_)));
}
