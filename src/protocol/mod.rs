//! Runtime update protocol of generated documents.
//!
//! This is the Rust model of the script the synthesizer embeds: payload normalization, typed
//! dispatch, the load lifecycle with its update queue and first-play guard, and the two host
//! surfaces. Time is virtual; callers advance the clock explicitly.

/// Host surface for the channel-graphics profile.
pub mod channel;
pub(crate) mod coerce;
/// Controller configuration shared with the synthesizer.
pub mod config;
/// Typed writes onto a bound view model.
pub mod dispatch;
pub(crate) mod image;
/// Case-insensitive property index.
pub mod index;
pub(crate) mod lenient;
pub mod lifecycle;
/// Self-sequencing streaming-overlay profile.
pub mod overlay;
/// Payload normalization into flat mappings.
pub mod payload;
/// Boot URL query parameters.
pub mod query;
/// Virtual clock and one-shot timers.
pub mod timers;
pub(crate) mod xml;

pub use channel::ChannelGraphics;
pub use config::{
    ControllerConfig, DEFAULT_FIRST_PLAY_GRACE_MS, HostProfile, Timers, TriggerBindings,
};
pub use dispatch::{DispatchReport, Dispatcher};
pub use index::PropertyIndex;
pub use lifecycle::{Controller, LifecycleState};
pub use overlay::{OverlaySequence, resolve_timers};
pub use payload::{FlatPayload, Payload, normalize};
pub use query::BootParams;
