use serde_json::Value;

use crate::foundation::core::PropertyType;
use crate::foundation::error::{CuegenError, CuegenResult};
use crate::protocol::coerce::{should_fire, to_boolean, to_color, to_number, to_text};
use crate::protocol::image::image_request;
use crate::protocol::index::PropertyIndex;
use crate::protocol::payload::FlatPayload;
use crate::runtime::{AccessorError, ViewModelHandle};
use crate::schema::model::Schema;

/// What happened to each key of one dispatch pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Properties assigned.
    pub applied: Vec<String>,
    /// Triggers fired.
    pub fired: Vec<String>,
    /// Keys ignored: unresolved, no accessor, or a value the type rejects.
    pub skipped: Vec<String>,
    /// Properties whose accessor failed.
    pub failed: Vec<String>,
}

impl DispatchReport {
    /// Return `true` when something was assigned or fired.
    pub fn touched_anything(&self) -> bool {
        !(self.applied.is_empty() && self.fired.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Applied,
    Fired,
    Rejected,
}

/// Applies flat payloads to a bound view model.
///
/// Keys that resolve through the [`PropertyIndex`] take the declared-type path. Unresolved keys
/// probe accessors in [`PropertyType::PROBE_ORDER`]; an absent accessor or a failing one moves
/// on to the next type.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    index: PropertyIndex,
}

impl Dispatcher {
    /// Dispatcher over an existing index.
    pub fn new(index: PropertyIndex) -> Self {
        Self { index }
    }

    /// Dispatcher indexing `schema`.
    pub fn from_schema(schema: &Schema) -> Self {
        Self::new(PropertyIndex::from_schema(schema))
    }

    /// Underlying index.
    pub fn index(&self) -> &PropertyIndex {
        &self.index
    }

    /// Apply every entry of `payload`. A failing property never aborts the pass.
    pub fn apply(&self, vm: &mut dyn ViewModelHandle, payload: &FlatPayload) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (key, value) in payload.iter() {
            match self.index.resolve(key) {
                Some((name, ty)) => match write_as(vm, name, ty, value) {
                    Some(Ok(outcome)) => record(&mut report, name, outcome),
                    Some(Err(e)) => {
                        tracing::warn!(property = name, error = %e, "property write failed");
                        report.failed.push(name.to_string());
                    }
                    None => {
                        tracing::warn!(property = name, ty = %ty, "declared property has no accessor");
                        report.skipped.push(name.to_string());
                    }
                },
                None => match probe(vm, key, value) {
                    Some(outcome) => record(&mut report, key, outcome),
                    None => {
                        tracing::debug!(key, "ignored unresolved payload key");
                        report.skipped.push(key.to_string());
                    }
                },
            }
        }
        report
    }
}

fn record(report: &mut DispatchReport, name: &str, outcome: Outcome) {
    let bucket = match outcome {
        Outcome::Applied => &mut report.applied,
        Outcome::Fired => &mut report.fired,
        Outcome::Rejected => &mut report.skipped,
    };
    bucket.push(name.to_string());
}

fn probe(vm: &mut dyn ViewModelHandle, key: &str, value: &Value) -> Option<Outcome> {
    for ty in PropertyType::PROBE_ORDER {
        match write_as(vm, key, ty, value) {
            None => continue,
            Some(Err(e)) => {
                tracing::debug!(key, ty = %ty, error = %e, "probe accessor failed");
                continue;
            }
            Some(Ok(outcome)) => return Some(outcome),
        }
    }
    None
}

/// Typed write. `None` means there is no accessor of that type for `name`.
fn write_as(
    vm: &mut dyn ViewModelHandle,
    name: &str,
    ty: PropertyType,
    value: &Value,
) -> Option<CuegenResult<Outcome>> {
    let wrap = |r: Result<(), AccessorError>, ok: Outcome| {
        r.map(|()| ok)
            .map_err(|e| CuegenError::property_write(name, e.0))
    };

    match ty {
        PropertyType::String => {
            let slot = vm.string_prop(name)?;
            Some(wrap(slot.set_value(to_text(value)), Outcome::Applied))
        }
        PropertyType::Number => {
            let slot = vm.number_prop(name)?;
            Some(match to_number(value) {
                Some(n) => wrap(slot.set_value(n), Outcome::Applied),
                None => Ok(Outcome::Rejected),
            })
        }
        PropertyType::Boolean => {
            let slot = vm.boolean_prop(name)?;
            Some(wrap(slot.set_value(to_boolean(value)), Outcome::Applied))
        }
        PropertyType::Color => {
            let slot = vm.color_prop(name)?;
            Some(match to_color(value) {
                Some(c) => wrap(slot.set_value(c.0), Outcome::Applied),
                None => Ok(Outcome::Rejected),
            })
        }
        PropertyType::Trigger => {
            let slot = vm.trigger_prop(name)?;
            Some(if should_fire(value) {
                wrap(slot.fire(), Outcome::Fired)
            } else {
                Ok(Outcome::Rejected)
            })
        }
        PropertyType::Image => {
            let slot = vm.image_prop(name)?;
            Some(match image_request(value) {
                Ok(req) => wrap(slot.assign(req), Outcome::Applied),
                Err(e) => Err(CuegenError::property_write(name, e.to_string())),
            })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/dispatch.rs"]
mod tests;
