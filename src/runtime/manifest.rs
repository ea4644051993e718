//! Runtime stand-in backed by a JSON manifest describing an animation file.
//!
//! ```json
//! {
//!   "artboards": [{
//!     "name": "Lower Third",
//!     "stateMachines": ["Main"],
//!     "viewModel": [{ "name": "Title", "type": "string", "value": "Hello" }]
//!   }]
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::foundation::core::PropertyType;
use crate::foundation::error::{CuegenError, CuegenResult};
use crate::runtime::memory::MemoryModel;
use crate::runtime::{
    AnimationRuntime, ArtboardInfo, FileLayout, InstanceRequest, LiveInstance, StateMachineInfo,
};

#[derive(Debug, Deserialize)]
struct ManifestDoc {
    artboards: Vec<ManifestArtboard>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestArtboard {
    name: String,
    #[serde(default)]
    state_machines: Vec<String>,
    #[serde(default)]
    view_model: Vec<ManifestProp>,
}

#[derive(Debug, Deserialize)]
struct ManifestProp {
    name: String,
    #[serde(rename = "type")]
    ty: PropertyType,
    #[serde(default)]
    value: Value,
}

/// [`AnimationRuntime`] reading JSON manifests instead of binary animation files.
#[derive(Clone, Copy, Debug, Default)]
pub struct ManifestRuntime;

impl ManifestRuntime {
    fn parse(source: &[u8]) -> CuegenResult<ManifestDoc> {
        let source = source.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(source);
        let doc: ManifestDoc = serde_json::from_slice(source)
            .map_err(|e| CuegenError::load(format!("parse animation manifest: {e}")))?;
        if doc.artboards.is_empty() {
            return Err(CuegenError::load("animation manifest declares no artboards"));
        }
        Ok(doc)
    }

    /// Observable model for `artboard`, with manifest defaults as raw values.
    pub fn model_for(&self, source: &[u8], artboard: &str) -> CuegenResult<MemoryModel> {
        let doc = Self::parse(source)?;
        let ab = doc
            .artboards
            .into_iter()
            .find(|a| a.name == artboard)
            .ok_or_else(|| CuegenError::load(format!("unknown artboard \"{artboard}\"")))?;
        Ok(ab
            .view_model
            .into_iter()
            .fold(MemoryModel::new(), |m, p| m.with(p.name, p.ty, p.value)))
    }
}

impl AnimationRuntime for ManifestRuntime {
    fn inspect(&self, source: &[u8]) -> CuegenResult<FileLayout> {
        let doc = Self::parse(source)?;
        Ok(FileLayout {
            artboards: doc
                .artboards
                .into_iter()
                .map(|a| ArtboardInfo {
                    name: a.name,
                    state_machines: a
                        .state_machines
                        .into_iter()
                        .map(|name| StateMachineInfo { name })
                        .collect(),
                })
                .collect(),
        })
    }

    fn instantiate(
        &self,
        source: &[u8],
        request: &InstanceRequest<'_>,
    ) -> CuegenResult<Box<dyn LiveInstance>> {
        let layout = self.inspect(source)?;
        let ab = layout
            .artboards
            .iter()
            .find(|a| a.name == request.artboard)
            .ok_or_else(|| {
                CuegenError::load(format!("unknown artboard \"{}\"", request.artboard))
            })?;
        if let Some(sm) = request.state_machine
            && !ab.state_machines.iter().any(|s| s.name == sm)
        {
            return Err(CuegenError::load(format!(
                "artboard \"{}\" has no state machine \"{sm}\"",
                ab.name
            )));
        }

        let model = self.model_for(source, request.artboard)?;
        Ok(Box::new(model.instance()))
    }
}
