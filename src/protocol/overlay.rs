use std::future::Future;

use crate::foundation::error::CuegenResult;
use crate::protocol::config::{ControllerConfig, HostProfile, Timers};
use crate::protocol::lifecycle::Controller;
use crate::protocol::query::BootParams;
use crate::runtime::LiveInstance;
use crate::schema::model::Schema;

/// Apply URL overrides (`startMs`, `outAfterMs`, `clearAfterMs`) to the embedded timers.
pub fn resolve_timers(base: Timers, params: &BootParams) -> Timers {
    Timers {
        start_delay_ms: params.start_ms.unwrap_or(base.start_delay_ms),
        exit_after_ms: params.out_after_ms.unwrap_or(base.exit_after_ms),
        purge_after_ms: params.clear_after_ms.unwrap_or(base.purge_after_ms),
    }
}

/// Self-sequencing streaming-overlay document.
///
/// Booting schedules play and enter at `startDelayMs`, exit `exitAfterMs` later and cleanup
/// `purgeAfterMs` after the exit. There is no host command surface.
#[derive(Debug)]
pub struct OverlaySequence {
    controller: Controller,
    timers: Timers,
}

impl OverlaySequence {
    /// Boot the sequence at virtual time 0.
    pub fn boot(schema: &Schema, mut config: ControllerConfig, params: &BootParams) -> Self {
        config.profile = HostProfile::StreamingOverlay;
        let timers = resolve_timers(config.timers, params);
        let mut controller =
            Controller::new(schema, config).with_boot_values(params.values.clone());
        controller.schedule_overlay(timers);
        tracing::debug!(
            start_ms = timers.start_delay_ms,
            exit_after_ms = timers.exit_after_ms,
            purge_after_ms = timers.purge_after_ms,
            "overlay sequence scheduled"
        );
        Self { controller, timers }
    }

    /// Effective schedule.
    pub fn timers(&self) -> Timers {
        self.timers
    }

    /// Bind the loaded instance.
    pub fn bind(&mut self, instance: Box<dyn LiveInstance>) {
        self.controller.bind(instance);
    }

    /// Await the load future, then bind.
    pub async fn bind_when_loaded<F>(&mut self, load: F)
    where
        F: Future<Output = CuegenResult<Box<dyn LiveInstance>>>,
    {
        self.controller.bind_when_loaded(load).await;
    }

    /// Advance the virtual clock by `delta_ms`.
    pub fn advance_by(&mut self, delta_ms: u64) {
        self.controller.advance_by(delta_ms);
    }

    /// Advance the virtual clock to `at_ms`.
    pub fn advance_to(&mut self, at_ms: u64) {
        self.controller.advance_to(at_ms);
    }

    /// Unload hook.
    pub fn teardown(&mut self) {
        self.controller.teardown();
    }

    /// Underlying controller.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }
}
