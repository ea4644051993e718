//! Data-binding schema extraction and broadcast playout template generation for view-model driven
//! animations.
//!
//! [`SchemaExtractor`] reads a source file through an [`runtime::AnimationRuntime`] and captures its
//! typed view-model defaults as a [`Schema`]. [`synth::synthesize`] turns a schema into a
//! self-contained HTML document carrying the update protocol for a channel-graphics server or a
//! streaming-overlay browser source. [`protocol`] models that protocol natively so its behavior
//! can be driven and observed without a browser.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod schema;

pub mod preset;
pub mod protocol;
pub mod runtime;
pub mod synth;

pub use foundation::core::{Argb, PropertyType, PropertyValue, format_number};
pub use foundation::error::{CuegenError, CuegenResult};
pub use preset::{PresetOptions, PresetShape, export_preset};
pub use schema::extract::SchemaExtractor;
pub use schema::model::{PropertyDescriptor, Schema};
pub use synth::{GeneratedDocument, SynthOptions, read_baked_schema, synthesize};
