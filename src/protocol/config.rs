use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default first-play grace window in milliseconds.
pub const DEFAULT_FIRST_PLAY_GRACE_MS: u64 = 150;

/// Target playout host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostProfile {
    /// Channel graphics server driving the document through global functions.
    #[default]
    ChannelGraphics,
    /// Streaming overlay browser source; self-sequencing, no command surface.
    StreamingOverlay,
}

impl HostProfile {
    /// Wire name (`"channel-graphics"` / `"streaming-overlay"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChannelGraphics => "channel-graphics",
            Self::StreamingOverlay => "streaming-overlay",
        }
    }
}

impl fmt::Display for HostProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger names fired by lifecycle commands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TriggerBindings {
    /// Fired when playback starts.
    pub enter: Option<String>,
    /// Fired on stop / overlay exit.
    pub exit: Option<String>,
    /// Fired on advance (`next`).
    pub advance: Option<String>,
}

impl TriggerBindings {
    /// Every configured trigger name.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        [&self.enter, &self.exit, &self.advance]
            .into_iter()
            .filter_map(|t| t.as_deref())
    }
}

/// Streaming-overlay schedule, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Timers {
    /// Delay from boot to playback start.
    pub start_delay_ms: u64,
    /// Delay from start to exit; `0` disables the exit.
    pub exit_after_ms: u64,
    /// Delay from exit to cleanup; `0` disables the cleanup.
    pub purge_after_ms: u64,
}

/// Everything the lifecycle controller needs besides the schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Host profile.
    pub profile: HostProfile,
    /// Lifecycle triggers.
    pub triggers: TriggerBindings,
    /// First-play guard window (channel-graphics only). `0` disables the guard.
    pub first_play_grace_ms: u64,
    /// Overlay schedule.
    pub timers: Timers,
    /// Values applied first when the instance binds.
    pub baked_defaults: BTreeMap<String, String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            profile: HostProfile::default(),
            triggers: TriggerBindings::default(),
            first_play_grace_ms: DEFAULT_FIRST_PLAY_GRACE_MS,
            timers: Timers::default(),
            baked_defaults: BTreeMap::new(),
        }
    }
}
