use std::future::Future;

use crate::foundation::error::CuegenResult;
use crate::protocol::config::{ControllerConfig, HostProfile};
use crate::protocol::lifecycle::Controller;
use crate::protocol::payload::Payload;
use crate::protocol::query::BootParams;
use crate::runtime::LiveInstance;
use crate::schema::model::Schema;

/// Command surface of a channel-graphics document.
///
/// Mirrors the document globals `update`/`data`/`SetData`, `play`, `next`, `stop` and `remove`.
/// No command returns an error.
#[derive(Debug)]
pub struct ChannelGraphics {
    controller: Controller,
}

impl ChannelGraphics {
    /// Unbound surface. The profile in `config` is forced to channel-graphics.
    pub fn new(schema: &Schema, mut config: ControllerConfig) -> Self {
        config.profile = HostProfile::ChannelGraphics;
        Self {
            controller: Controller::new(schema, config),
        }
    }

    /// Unbound surface seeded with the document's boot query values.
    ///
    /// On bind they apply after the baked defaults and before any queued update. Timer
    /// parameters in `params` have no meaning on this profile and are ignored.
    pub fn boot(schema: &Schema, mut config: ControllerConfig, params: &BootParams) -> Self {
        config.profile = HostProfile::ChannelGraphics;
        tracing::debug!(values = params.values.len(), "channel graphics boot values");
        Self {
            controller: Controller::new(schema, config).with_boot_values(params.values.clone()),
        }
    }

    /// Feed one payload (JSON text, XML text or a native value).
    pub fn update(&mut self, payload: impl Into<Payload>) {
        self.controller.update(&payload.into());
    }

    /// Alias of [`ChannelGraphics::update`].
    pub fn data(&mut self, payload: impl Into<Payload>) {
        self.update(payload);
    }

    /// Alias of [`ChannelGraphics::update`].
    pub fn set_data(&mut self, payload: impl Into<Payload>) {
        self.update(payload);
    }

    /// Guarded play.
    pub fn play(&mut self) {
        self.controller.play();
    }

    /// Fire the advance trigger.
    pub fn next(&mut self) {
        self.controller.advance();
    }

    /// Exit trigger, else native stop.
    pub fn stop(&mut self) {
        self.controller.stop();
    }

    /// Release the instance.
    pub fn remove(&mut self) {
        self.controller.remove();
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

    /// Unload hook.
    pub fn teardown(&mut self) {
        self.controller.teardown();
    }

    /// Advance the virtual clock by `delta_ms`.
    pub fn advance_by(&mut self, delta_ms: u64) {
        self.controller.advance_by(delta_ms);
    }

    /// Advance the virtual clock to `at_ms`.
    pub fn advance_to(&mut self, at_ms: u64) {
        self.controller.advance_to(at_ms);
    }

    /// Underlying controller.
    pub fn controller(&self) -> &Controller {
        &self.controller
    }
}
