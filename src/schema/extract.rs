use serde_json::Value;

use crate::foundation::core::PropertyType;
use crate::foundation::error::{CuegenError, CuegenResult};
use crate::runtime::{AnimationRuntime, FileLayout, InstanceRequest, LiveInstance, ViewModelHandle};
use crate::schema::coerce::coerce_default;
use crate::schema::model::{PropertyDescriptor, Schema};

/// Builds [`Schema`] snapshots by loading a source through an [`AnimationRuntime`].
///
/// Every call is independent: a failed extraction leaves nothing behind and the caller may retry
/// with another source or selection.
#[derive(Clone, Debug, Default)]
pub struct SchemaExtractor<R> {
    runtime: R,
}

impl<R: AnimationRuntime> SchemaExtractor<R> {
    /// Wrap a runtime.
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    /// Underlying runtime.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Structural query: artboards and their state machines. Does not instantiate anything.
    #[tracing::instrument(skip(self, source), fields(bytes = source.len()))]
    pub fn inspect(&self, source: &[u8]) -> CuegenResult<FileLayout> {
        self.runtime.inspect(source)
    }

    /// Resolve the selection, instantiate headlessly and read every declared default.
    ///
    /// Unknown or missing selections fall back to the first artboard / state machine. The
    /// offscreen instance is released before returning, on success and on failure.
    #[tracing::instrument(skip(self, source), fields(bytes = source.len()))]
    pub fn build_schema(
        &self,
        source: &[u8],
        artboard: Option<&str>,
        state_machine: Option<&str>,
    ) -> CuegenResult<Schema> {
        let layout = self.runtime.inspect(source)?;
        let (artboard, state_machine) = resolve_selection(&layout, artboard, state_machine)?;

        let request = InstanceRequest {
            artboard: &artboard,
            state_machine: state_machine.as_deref(),
            auto_bind: true,
            headless: true,
        };
        let mut guard = InstanceGuard(self.runtime.instantiate(source, &request)?);
        let properties = read_properties(guard.0.as_mut());

        tracing::debug!(
            artboard = %artboard,
            props = properties.len(),
            "extracted view-model schema"
        );
        Schema::new(artboard, state_machine.unwrap_or_default(), properties)
    }
}

/// Calls `cleanup` when dropped so every exit path releases the offscreen instance.
struct InstanceGuard(Box<dyn LiveInstance>);

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        self.0.cleanup();
    }
}

pub(crate) fn resolve_selection(
    layout: &FileLayout,
    artboard: Option<&str>,
    state_machine: Option<&str>,
) -> CuegenResult<(String, Option<String>)> {
    let first = layout
        .artboards
        .first()
        .ok_or_else(|| CuegenError::load("source declares no artboards"))?;

    let ab = match artboard {
        Some(name) => layout
            .artboards
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| {
                tracing::warn!(requested = name, fallback = %first.name, "artboard not found");
                first
            }),
        None => first,
    };

    let first_sm = ab.state_machines.first().map(|s| s.name.clone());
    let sm = match state_machine {
        Some(name) if ab.state_machines.iter().any(|s| s.name == name) => Some(name.to_string()),
        Some(name) => {
            tracing::warn!(
                requested = name,
                fallback = first_sm.as_deref().unwrap_or(""),
                "state machine not found"
            );
            first_sm
        }
        None => first_sm,
    };

    Ok((ab.name.clone(), sm))
}

fn read_properties(instance: &mut dyn LiveInstance) -> Vec<PropertyDescriptor> {
    let Some(vm) = instance.view_model() else {
        tracing::debug!("instance has no bound view model");
        return Vec::new();
    };

    vm.properties()
        .into_iter()
        .map(|(name, ty)| {
            let default_value = read_raw(vm, &name, ty).and_then(|raw| coerce_default(ty, &raw));
            PropertyDescriptor::new(name, ty, default_value)
        })
        .collect()
}

fn read_raw(vm: &mut dyn ViewModelHandle, name: &str, ty: PropertyType) -> Option<Value> {
    let read = match ty {
        PropertyType::String => vm.string_prop(name).map(|s| s.raw_value()),
        PropertyType::Number => vm.number_prop(name).map(|s| s.raw_value()),
        PropertyType::Boolean => vm.boolean_prop(name).map(|s| s.raw_value()),
        PropertyType::Color => vm.color_prop(name).map(|s| s.raw_value()),
        PropertyType::Trigger | PropertyType::Image => return None,
    };
    match read {
        Some(Ok(raw)) => Some(raw),
        Some(Err(e)) => {
            tracing::warn!(property = name, error = %e, "default value unreadable");
            None
        }
        None => {
            tracing::warn!(property = name, ty = %ty, "declared property has no accessor");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/extract.rs"]
mod tests;
