//! Load lifecycle, update queueing and the first-play guard.
//!
//! A [`Controller`] owns the single runtime instance of a document. Commands never fail: they
//! either act, queue, defer or degrade to a logged no-op.

use std::collections::VecDeque;
use std::future::Future;

use crate::foundation::error::CuegenResult;
use crate::protocol::config::{ControllerConfig, HostProfile, Timers};
use crate::protocol::dispatch::Dispatcher;
use crate::protocol::payload::{FlatPayload, Payload, normalize};
use crate::protocol::timers::{TimerId, TimerQueue};
use crate::runtime::LiveInstance;
use crate::schema::model::Schema;

/// Observable controller state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Instance not loaded yet; updates are queued.
    Unbound,
    /// Instance loaded; updates apply immediately.
    Bound,
    /// Cleaned up; every command is a no-op.
    Released,
}

enum Binding {
    Unbound,
    Bound(Box<dyn LiveInstance>),
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    DeferredPlay,
    OverlayEnter,
    OverlayExit,
    OverlayPurge,
}

/// Lifecycle controller of one generated document.
pub struct Controller {
    config: ControllerConfig,
    dispatcher: Dispatcher,
    boot_values: Vec<(String, String)>,
    binding: Binding,
    pending: VecDeque<FlatPayload>,
    timers: TimerQueue<Action>,
    overlay: Option<Timers>,
    updates_received: u64,
    deferred_play: Option<TimerId>,
    play_on_bind: bool,
    playing: bool,
    ready: bool,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("profile", &self.config.profile)
            .field("state", &self.state())
            .field("pending", &self.pending.len())
            .field("updates_received", &self.updates_received)
            .field("playing", &self.playing)
            .field("ready", &self.ready)
            .field("now_ms", &self.timers.now())
            .finish()
    }
}

impl Controller {
    /// Unbound controller for `schema`.
    pub fn new(schema: &Schema, config: ControllerConfig) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::from_schema(schema),
            boot_values: Vec::new(),
            binding: Binding::Unbound,
            pending: VecDeque::new(),
            timers: TimerQueue::default(),
            overlay: None,
            updates_received: 0,
            deferred_play: None,
            play_on_bind: false,
            playing: false,
            ready: false,
        }
    }

    /// Attach `vm.<Name>` boot values, applied in the given order after baked defaults at bind
    /// time.
    pub fn with_boot_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.boot_values = values
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        match self.binding {
            Binding::Unbound => LifecycleState::Unbound,
            Binding::Bound(_) => LifecycleState::Bound,
            Binding::Released => LifecycleState::Released,
        }
    }

    /// Whether the bind-time drain has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether playback has been started and not stopped.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Number of updates waiting for the instance.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of updates accepted so far (applied or queued).
    pub fn updates_received(&self) -> u64 {
        self.updates_received
    }

    /// Whether a guarded play is waiting for its window to elapse.
    pub fn has_deferred_play(&self) -> bool {
        self.deferred_play.is_some()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Dispatcher used for every write.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Bind the loaded instance: baked defaults, boot values, then queued updates in FIFO order.
    pub fn bind(&mut self, mut instance: Box<dyn LiveInstance>) {
        match self.binding {
            Binding::Unbound => {}
            Binding::Bound(_) => {
                tracing::warn!("instance already bound; releasing the late one");
                instance.cleanup();
                return;
            }
            Binding::Released => {
                tracing::debug!("bind after release; cleaning up instance");
                instance.cleanup();
                return;
            }
        }
        self.binding = Binding::Bound(instance);
        tracing::debug!(pending = self.pending.len(), "instance bound");

        let baked: FlatPayload = self
            .config
            .baked_defaults
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if !baked.is_empty() {
            self.apply(&baked);
        }

        let index = self.dispatcher.index();
        let boot: FlatPayload = self
            .boot_values
            .iter()
            .filter(|(name, _)| {
                let known = index.exact(name).is_some();
                if !known {
                    tracing::debug!(name = name.as_str(), "boot value names no property");
                }
                known
            })
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if !boot.is_empty() {
            self.apply(&boot);
        }

        while let Some(flat) = self.pending.pop_front() {
            self.apply(&flat);
        }
        self.ready = true;

        if std::mem::take(&mut self.play_on_bind) {
            self.start_playback();
        }
    }

    /// Await the load future once, then bind. A failed load leaves the controller unbound.
    pub async fn bind_when_loaded<F>(&mut self, load: F)
    where
        F: Future<Output = CuegenResult<Box<dyn LiveInstance>>>,
    {
        match load.await {
            Ok(instance) => self.bind(instance),
            Err(e) => tracing::warn!(error = %e, "animation failed to load"),
        }
    }

    /// Normalize and submit one host payload. Unparsable payloads are logged and discarded.
    pub fn update(&mut self, payload: &Payload) {
        if matches!(self.binding, Binding::Released) {
            tracing::debug!("update after release ignored");
            return;
        }
        match normalize(payload) {
            Ok(flat) => self.submit(flat),
            Err(e) => tracing::warn!(error = %e, "discarding update payload"),
        }
    }

    /// Submit an already normalized payload.
    pub fn submit(&mut self, flat: FlatPayload) {
        if matches!(self.binding, Binding::Released) {
            return;
        }
        self.updates_received += 1;
        if matches!(self.binding, Binding::Bound(_)) {
            self.apply(&flat);
        } else {
            tracing::debug!(keys = flat.len(), "queued update while unbound");
            self.pending.push_back(flat);
        }

        if let Some(id) = self.deferred_play.take() {
            self.timers.cancel(id);
            tracing::debug!("update arrived inside first-play window");
            self.run_play();
        }
    }

    /// Start playback, holding a first play for the grace window until data arrives.
    pub fn play(&mut self) {
        if matches!(self.binding, Binding::Released) || self.deferred_play.is_some() {
            return;
        }
        let grace = self.config.first_play_grace_ms;
        if self.config.profile == HostProfile::ChannelGraphics
            && self.updates_received == 0
            && grace > 0
        {
            tracing::debug!(grace_ms = grace, "holding first play for data");
            self.deferred_play = Some(self.timers.schedule(grace, Action::DeferredPlay));
            return;
        }
        self.run_play();
    }

    /// Fire the advance trigger, if bound and configured.
    pub fn advance(&mut self) {
        if !self.ready {
            return;
        }
        if let Some(name) = self.config.triggers.advance.clone() {
            self.fire(&name);
        }
    }

    /// Fire the exit trigger, falling back to the native stop.
    ///
    /// Only playback this controller started can be stopped: before the first successful native
    /// play (or after a failed one) the call just cancels any pending play and fires nothing.
    pub fn stop(&mut self) {
        if let Some(id) = self.deferred_play.take() {
            self.timers.cancel(id);
        }
        self.play_on_bind = false;
        if !self.ready || !self.playing {
            return;
        }
        self.playing = false;

        let exited = match self.config.triggers.exit.clone() {
            Some(name) => self.fire(&name),
            None => false,
        };
        if exited {
            return;
        }
        if let Binding::Bound(instance) = &mut self.binding
            && let Err(e) = instance.stop()
        {
            tracing::warn!(error = %e, "native stop failed");
        }
    }

    /// Release the instance. Later commands are no-ops.
    pub fn remove(&mut self) {
        self.timers.clear();
        self.pending.clear();
        self.deferred_play = None;
        self.play_on_bind = false;
        self.playing = false;
        self.ready = false;
        match std::mem::replace(&mut self.binding, Binding::Released) {
            Binding::Bound(mut instance) => {
                instance.cleanup();
                tracing::debug!("instance released");
            }
            Binding::Unbound => tracing::debug!("released before load"),
            Binding::Released => {}
        }
    }

    /// Unload hook. Same as [`Controller::remove`].
    pub fn teardown(&mut self) {
        self.remove();
    }

    /// Run every timer due up to `at_ms` and move the clock there.
    pub fn advance_to(&mut self, at_ms: u64) {
        while let Some((_, action)) = self.timers.pop_due(at_ms) {
            self.run(action);
        }
        self.timers.settle(at_ms);
    }

    /// Advance the clock by `delta_ms`.
    pub fn advance_by(&mut self, delta_ms: u64) {
        self.advance_to(self.timers.now().saturating_add(delta_ms));
    }

    /// Schedule the overlay sequence relative to the current clock.
    pub(crate) fn schedule_overlay(&mut self, timers: Timers) {
        self.overlay = Some(timers);
        self.timers.schedule(timers.start_delay_ms, Action::OverlayEnter);
    }

    fn run(&mut self, action: Action) {
        tracing::debug!(?action, now_ms = self.timers.now(), "timer fired");
        match action {
            Action::DeferredPlay => {
                self.deferred_play = None;
                self.run_play();
            }
            Action::OverlayEnter => {
                self.run_play();
                if let Some(t) = self.overlay
                    && t.exit_after_ms > 0
                {
                    self.timers.schedule(t.exit_after_ms, Action::OverlayExit);
                }
            }
            Action::OverlayExit => {
                self.stop();
                if let Some(t) = self.overlay
                    && t.purge_after_ms > 0
                {
                    self.timers.schedule(t.purge_after_ms, Action::OverlayPurge);
                }
            }
            Action::OverlayPurge => self.remove(),
        }
    }

    fn run_play(&mut self) {
        if self.ready {
            self.start_playback();
        } else {
            tracing::debug!("play requested before load; deferring to bind");
            self.play_on_bind = true;
        }
    }

    fn start_playback(&mut self) {
        let Binding::Bound(instance) = &mut self.binding else {
            return;
        };
        if let Err(e) = instance.play() {
            tracing::warn!(error = %e, "native play failed");
            return;
        }
        self.playing = true;
        if let Some(name) = self.config.triggers.enter.clone() {
            self.fire(&name);
        }
    }

    fn fire(&mut self, name: &str) -> bool {
        let Binding::Bound(instance) = &mut self.binding else {
            return false;
        };
        let canonical = self
            .dispatcher
            .index()
            .resolve(name)
            .map_or(name, |(n, _)| n);
        let Some(vm) = instance.view_model() else {
            return false;
        };
        let Some(trigger) = vm.trigger_prop(canonical) else {
            tracing::warn!(trigger = name, "configured trigger not found");
            return false;
        };
        match trigger.fire() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(trigger = name, error = %e, "trigger fire failed");
                false
            }
        }
    }

    fn apply(&mut self, flat: &FlatPayload) {
        let Binding::Bound(instance) = &mut self.binding else {
            return;
        };
        let Some(vm) = instance.view_model() else {
            tracing::warn!("bound instance exposes no view model");
            return;
        };
        let report = self.dispatcher.apply(vm, flat);
        tracing::debug!(
            applied = report.applied.len(),
            fired = report.fired.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "applied update"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/lifecycle.rs"]
mod tests;
