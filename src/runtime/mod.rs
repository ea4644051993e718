//! Capability interfaces for the third-party animation runtime.
//!
//! The runtime is a black box: given source bytes and an artboard/state-machine selection it yields
//! a live instance whose view model hands out typed property accessors. Every accessor lookup
//! returns `None` for unknown names instead of failing, and every accessor call may fail on its own
//! without affecting its siblings.

pub mod manifest;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::foundation::core::PropertyType;
use crate::foundation::error::CuegenResult;

/// Failure reported by a single runtime accessor.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AccessorError(pub String);

impl AccessorError {
    /// Build an accessor error from any message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Result type for accessor calls.
pub type AccessorResult<T> = Result<T, AccessorError>;

/// Read/write cell for a value-carrying property.
///
/// Reads return the runtime's raw representation, which is not guaranteed to match `T`
/// (a color may come back as a hex string, a boolean as a number).
pub trait ValueSlot<T> {
    /// Current raw value.
    fn raw_value(&self) -> AccessorResult<serde_json::Value>;
    /// Assign a typed value.
    fn set_value(&mut self, value: T) -> AccessorResult<()>;
}

/// Fire-once signal.
pub trait Fireable {
    /// Fire the trigger.
    fn fire(&mut self) -> AccessorResult<()>;
}

/// Decoded RGBA8 image handed to an image slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8 pixels, row-major.
    pub rgba8: Vec<u8>,
}

/// What to bind into an image slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRequest {
    /// Locally decoded pixels.
    Decoded(DecodedImage),
    /// Remote URL left for the runtime to fetch.
    Remote(String),
    /// Clear the binding.
    Clear,
}

/// Image-valued property.
pub trait ImageSlot {
    /// Bind or clear the image.
    fn assign(&mut self, image: ImageRequest) -> AccessorResult<()>;
}

/// Typed accessor handle of a bound view-model instance.
pub trait ViewModelHandle {
    /// Declared properties, in declaration order.
    fn properties(&self) -> Vec<(String, PropertyType)>;
    /// String accessor, if `name` is a string property.
    fn string_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<String>>;
    /// Number accessor, if `name` is a number property.
    fn number_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<f64>>;
    /// Boolean accessor, if `name` is a boolean property.
    fn boolean_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<bool>>;
    /// Color accessor (`0xAARRGGBB`), if `name` is a color property.
    fn color_prop(&mut self, name: &str) -> Option<&mut dyn ValueSlot<u32>>;
    /// Trigger accessor, if `name` is a trigger property.
    fn trigger_prop(&mut self, name: &str) -> Option<&mut dyn Fireable>;
    /// Image accessor, if `name` is an image property.
    fn image_prop(&mut self, name: &str) -> Option<&mut dyn ImageSlot>;
}

/// A loaded animation instance.
pub trait LiveInstance {
    /// Bound view model, when the file declares one.
    fn view_model(&mut self) -> Option<&mut dyn ViewModelHandle>;
    /// Start or resume playback.
    fn play(&mut self) -> AccessorResult<()>;
    /// Native stop.
    fn stop(&mut self) -> AccessorResult<()>;
    /// Release the instance. Must tolerate repeated calls.
    fn cleanup(&mut self);
}

/// State machine entry of [`FileLayout`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMachineInfo {
    /// State machine name.
    pub name: String,
}

/// Artboard entry of [`FileLayout`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtboardInfo {
    /// Artboard name.
    pub name: String,
    /// State machines declared on the artboard.
    pub state_machines: Vec<StateMachineInfo>,
}

/// Structural description of a source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLayout {
    /// Artboards in file order.
    pub artboards: Vec<ArtboardInfo>,
}

/// Parameters for [`AnimationRuntime::instantiate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceRequest<'a> {
    /// Artboard to instantiate.
    pub artboard: &'a str,
    /// State machine to drive, if any.
    pub state_machine: Option<&'a str>,
    /// Auto-bind the default view-model instance.
    pub auto_bind: bool,
    /// Offscreen instantiation with no presentation surface.
    pub headless: bool,
}

/// Entry point into the third-party runtime.
pub trait AnimationRuntime {
    /// Cheap, non-rendering structural query.
    fn inspect(&self, source: &[u8]) -> CuegenResult<FileLayout>;
    /// Load and instantiate one artboard.
    fn instantiate(
        &self,
        source: &[u8],
        request: &InstanceRequest<'_>,
    ) -> CuegenResult<Box<dyn LiveInstance>>;
}
