//! # Service
//!
//! Entry point tying the patch lifecycle, its reactive enablement and the actor overrides together

use std::sync::Arc;

use tracing::info;

use crate::actor::Actor;
use crate::animation::OverrideApplier;
use crate::condition::ConditionSource;
use crate::config::AnimationConfig;
use crate::memory::{MemoryError, ProcessMemory};
use crate::patcher::lifecycle::PatchLifecycle;
use crate::reactive::ReactiveEnablement;

/// Animation override service for one patched process
pub struct AnimationService<M: ProcessMemory> {
    /// Override patch, enabled while in gpose and not posing
    enablement: ReactiveEnablement<M>,
    /// Per-actor writes
    applier: OverrideApplier<M>,
}

impl<M: ProcessMemory + 'static> AnimationService<M> {
    /// Captures the patch targets, subscribes to both conditions and applies the state they currently call for
    pub fn start(
        memory: Arc<M>,
        config: &AnimationConfig,
        gpose: Arc<dyn ConditionSource>,
        posing: Arc<dyn ConditionSource>,
    ) -> Result<Self, MemoryError> {
        let lifecycle = PatchLifecycle::start(
            Arc::clone(&memory),
            config.override_target(),
            config.speed_hook,
        )?;
        let mut enablement = ReactiveEnablement::new(lifecycle, gpose, posing);
        enablement.start()?;

        info!(enabled = enablement.is_enabled(), "started animation service");

        Ok(Self {
            enablement,
            applier: OverrideApplier::new(memory, config.action_timeline_rows),
        })
    }
}

impl<M: ProcessMemory> AnimationService<M> {
    /// Whether the override patch is currently applied
    pub fn is_enabled(&self) -> bool {
        self.enablement.is_enabled()
    }

    /// Applies or reverts the override patch directly
    pub fn set_enabled(&self, enabled: bool) -> Result<(), MemoryError> {
        self.enablement.set_enabled(enabled)
    }

    /// Per-actor override writes
    pub fn applier(&self) -> &OverrideApplier<M> {
        &self.applier
    }

    /// See [`OverrideApplier::apply_override`]
    pub fn apply_override<A: Actor + ?Sized>(
        &self,
        actor: &A,
        animation_id: Option<u16>,
        animation_speed: Option<f32>,
        interrupt: bool,
    ) -> Result<(), MemoryError> {
        self.applier
            .apply_override(actor, animation_id, animation_speed, interrupt)
    }

    /// See [`OverrideApplier::reset_override`]
    pub fn reset_override<A: Actor + ?Sized>(&self, actor: &A) -> Result<(), MemoryError> {
        self.applier.reset_override(actor)
    }

    /// See [`OverrideApplier::force_action`]
    pub fn force_action<A: Actor + ?Sized>(
        &self,
        actor: &A,
        action: u16,
    ) -> Result<(), MemoryError> {
        self.applier.force_action(actor, action)
    }

    /// See [`OverrideApplier::draw_weapon`]
    pub fn draw_weapon<A: Actor + ?Sized>(&self, actor: &A) -> Result<(), MemoryError> {
        self.applier.draw_weapon(actor)
    }

    /// Releases the condition subscriptions and restores the original bytes.
    ///
    /// Teardown always completes; a failed restore is returned for reporting.
    pub fn shutdown(mut self) -> Result<(), MemoryError> {
        let result = self.enablement.shutdown();
        info!(restored = result.is_ok(), "stopped animation service");
        result
    }
}
