use serde_json::{Value, json};

use crate::foundation::core::PropertyType;
use crate::foundation::error::CuegenResult;
use crate::protocol::config::HostProfile;
use crate::protocol::index::PropertyIndex;
use crate::schema::model::Schema;
use crate::synth::options::{ResolvedOptions, SourceRef, SynthOptions};
use crate::synth::tables::{js_literal, js_literal_pretty};

/// DOM id of the canvas element.
pub(crate) const CANVAS_ID: &str = "cuegen-canvas";

/// DOM id of the schema data island.
pub(crate) const SCHEMA_ISLAND_ID: &str = "cuegen-schema";

const CHANNEL_JS: &str = include_str!("templates/channel.js");
const OVERLAY_JS: &str = include_str!("templates/overlay.js");

/// Name of the embedded setter for a declared type.
fn setter_fn(ty: PropertyType) -> &'static str {
    match ty {
        PropertyType::String => "setString",
        PropertyType::Number => "setNumber",
        PropertyType::Boolean => "setBoolean",
        PropertyType::Color => "setColor",
        PropertyType::Trigger => "fireTrigger",
        PropertyType::Image => "setImage",
    }
}

/// `CONFIG`, `PROP_INDEX`, `PROP_TYPES` and `PROP_SETTERS` declarations.
pub(crate) fn tables_script(
    schema: &Schema,
    options: &SynthOptions,
    resolved: &ResolvedOptions,
) -> CuegenResult<String> {
    let index = PropertyIndex::from_schema(schema);
    let mut out = String::new();

    out.push_str(&format!(
        "var CONFIG = {};\n",
        js_literal_pretty(&config_object(schema, options, resolved))?
    ));
    out.push_str(&format!(
        "var PROP_INDEX = {};\n",
        js_literal(index.lowercase_table())?
    ));
    out.push_str(&format!(
        "var PROP_TYPES = {};\n",
        js_literal(index.type_table())?
    ));

    if schema.properties().is_empty() {
        out.push_str("var PROP_SETTERS = {};\n");
        return Ok(out);
    }
    out.push_str("var PROP_SETTERS = {\n");
    let last = schema.properties().len() - 1;
    for (i, p) in schema.properties().iter().enumerate() {
        let name = js_literal(&p.name)?;
        out.push_str(&format!(
            "  {name}: function (vmi, v) {{ return {}(vmi, {name}, v); }}{}\n",
            setter_fn(p.ty),
            if i == last { "" } else { "," }
        ));
    }
    out.push_str("};\n");
    Ok(out)
}

fn config_object(schema: &Schema, options: &SynthOptions, resolved: &ResolvedOptions) -> Value {
    let source = match &resolved.source {
        SourceRef::Embedded(b64) => json!({ "base64": b64 }),
        SourceRef::External(path) => json!({ "src": path }),
    };
    let t = &options.trigger_bindings;
    json!({
        "profile": options.host_profile.as_str(),
        "artboard": schema.artboard(),
        "stateMachine": schema.state_machine(),
        "source": source,
        "triggers": {
            "enter": t.enter,
            "exit": t.exit,
            "advance": t.advance,
        },
        "timers": {
            "startDelayMs": options.timers.start_delay_ms,
            "exitAfterMs": options.timers.exit_after_ms,
            "purgeAfterMs": options.timers.purge_after_ms,
        },
        "bakedDefaults": resolved.baked_defaults,
        "firstPlayGraceMs": options.first_play_grace_ms,
        "canvasId": CANVAS_ID,
    })
}

/// Command surface for the selected host profile.
pub(crate) fn profile_script(options: &SynthOptions) -> &'static str {
    match options.host_profile {
        HostProfile::ChannelGraphics => CHANNEL_JS,
        HostProfile::StreamingOverlay => OVERLAY_JS,
    }
}
