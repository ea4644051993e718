use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::foundation::core::PropertyType;
use crate::foundation::error::{CuegenError, CuegenResult};
use crate::protocol::config::{
    ControllerConfig, DEFAULT_FIRST_PLAY_GRACE_MS, HostProfile, Timers, TriggerBindings,
};
use crate::protocol::index::PropertyIndex;
use crate::schema::model::Schema;

/// Source path used when the payload is not embedded and no path is given.
pub const DEFAULT_EXTERNAL_PATH: &str = "animation.riv";

/// Base URL the runtime scripts are loaded from.
pub const DEFAULT_RUNTIME_BASE_URL: &str = "https://unpkg.com/@rive-app";

/// Major version of the runtime scripts.
pub const RUNTIME_MAJOR_VERSION: u32 = 2;

/// Which runtime build the document loads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderBackend {
    /// 2D canvas build.
    #[default]
    Raster,
    /// WebGL2 build.
    Accelerated,
}

impl RenderBackend {
    /// Runtime package name for this backend.
    pub fn package(self) -> &'static str {
        match self {
            Self::Raster => "canvas",
            Self::Accelerated => "webgl2",
        }
    }
}

/// Canvas size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Synthesizer options, loadable from camelCase JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SynthOptions {
    /// Target host.
    pub host_profile: HostProfile,
    /// Runtime build.
    pub render_backend: RenderBackend,
    /// Inline the source bytes as base64.
    pub embed_payload: bool,
    /// Standard base64 of the source; required when embedding.
    pub payload_base64: Option<String>,
    /// Source path used when not embedding.
    pub external_path: Option<String>,
    /// Lifecycle trigger names.
    pub trigger_bindings: TriggerBindings,
    /// Overlay schedule.
    pub timers: Timers,
    /// Values applied first at bind.
    pub baked_defaults: BTreeMap<String, String>,
    /// First-play guard window.
    pub first_play_grace_ms: u64,
    /// Document title; defaults to the artboard name.
    pub title: Option<String>,
    /// Canvas size.
    pub canvas: CanvasSize,
    /// Base URL of the runtime scripts.
    pub runtime_base_url: String,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            host_profile: HostProfile::default(),
            render_backend: RenderBackend::default(),
            embed_payload: false,
            payload_base64: None,
            external_path: None,
            trigger_bindings: TriggerBindings::default(),
            timers: Timers::default(),
            baked_defaults: BTreeMap::new(),
            first_play_grace_ms: DEFAULT_FIRST_PLAY_GRACE_MS,
            title: None,
            canvas: CanvasSize::default(),
            runtime_base_url: DEFAULT_RUNTIME_BASE_URL.to_string(),
        }
    }
}

impl SynthOptions {
    /// Parse options JSON from a string.
    pub fn from_json_str(s: &str) -> CuegenResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| CuegenError::validation(format!("parse options JSON: {e}")))
    }

    /// Parse options JSON from a file.
    pub fn from_path(path: impl AsRef<Path>) -> CuegenResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CuegenError::validation(format!("open options JSON '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| CuegenError::validation(format!("parse options JSON: {e}")))
    }

    /// Embed `bytes` as the document's source.
    pub fn embed_bytes(&mut self, bytes: &[u8]) {
        self.embed_payload = true;
        self.payload_base64 = Some(STANDARD.encode(bytes));
    }

    /// Lifecycle configuration the document synthesized for `schema` runs with.
    ///
    /// Baked defaults naming no property of `schema` are left out, as they are from the document.
    pub fn controller_config(&self, schema: &Schema) -> ControllerConfig {
        ControllerConfig {
            profile: self.host_profile,
            triggers: self.trigger_bindings.clone(),
            first_play_grace_ms: self.first_play_grace_ms,
            timers: self.timers,
            baked_defaults: self.known_baked_defaults(&PropertyIndex::from_schema(schema)),
        }
    }

    fn known_baked_defaults(&self, index: &PropertyIndex) -> BTreeMap<String, String> {
        self.baked_defaults
            .iter()
            .filter(|(name, _)| {
                let known = index.resolve(name).is_some();
                if !known {
                    tracing::warn!(name = name.as_str(), "dropping baked default for unknown name");
                }
                known
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub(crate) fn resolve(&self, schema: &Schema) -> CuegenResult<ResolvedOptions> {
        let source = if self.embed_payload {
            let b64 = self
                .payload_base64
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| CuegenError::validation("embedPayload requires payloadBase64"))?;
            STANDARD
                .decode(b64)
                .map_err(|e| CuegenError::validation(format!("payloadBase64: {e}")))?;
            SourceRef::Embedded(b64.to_string())
        } else {
            match self.external_path.as_deref().map(str::trim) {
                Some(p) if !p.is_empty() => SourceRef::External(p.to_string()),
                _ => {
                    tracing::debug!(path = DEFAULT_EXTERNAL_PATH, "no external path given");
                    SourceRef::External(DEFAULT_EXTERNAL_PATH.to_string())
                }
            }
        };

        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(CuegenError::validation(
                "canvas width and height must be positive",
            ));
        }

        let base = self.runtime_base_url.trim().trim_end_matches('/');
        if base.is_empty() || base.contains(|c: char| c.is_whitespace() || "\"'<>".contains(c)) {
            return Err(CuegenError::validation(format!(
                "invalid runtimeBaseUrl '{}'",
                self.runtime_base_url
            )));
        }
        let runtime_src = format!(
            "{base}/{}@{RUNTIME_MAJOR_VERSION}/rive.js",
            self.render_backend.package()
        );

        let index = PropertyIndex::from_schema(schema);
        for name in self.trigger_bindings.names() {
            match index.resolve(name) {
                Some((_, PropertyType::Trigger)) => {}
                Some((canonical, ty)) => tracing::warn!(
                    trigger = name,
                    canonical,
                    %ty,
                    "trigger binding names a non-trigger property"
                ),
                None => {
                    tracing::warn!(trigger = name, "trigger binding names no declared property")
                }
            }
        }

        Ok(ResolvedOptions {
            source,
            baked_defaults: self.known_baked_defaults(&index),
            title: self
                .title
                .clone()
                .unwrap_or_else(|| schema.artboard().to_string()),
            runtime_src,
        })
    }
}

/// Where the document loads its source from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SourceRef {
    Embedded(String),
    External(String),
}

#[derive(Clone, Debug)]
pub(crate) struct ResolvedOptions {
    pub(crate) source: SourceRef,
    pub(crate) baked_defaults: BTreeMap<String, String>,
    pub(crate) title: String,
    pub(crate) runtime_src: String,
}
