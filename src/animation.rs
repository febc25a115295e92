//! # Animation
//!
//! Per-actor animation overrides: speed, forced animation id and interrupting the current animation

use std::sync::Arc;

use tracing::{debug, trace};

use crate::actor::{Actor, ActorField};
use crate::memory::{MemoryError, Primitive, ProcessMemory};

/// Animation id that clears an override
pub const RESET_ANIMATION_ID: u16 = 0;
/// Animation id of drawing the equipped weapon
pub const DRAW_WEAPON_ANIMATION_ID: u16 = 190;
/// Normal playback speed
pub const DEFAULT_ANIMATION_SPEED: f32 = 1.0;

/// Writes animation overrides onto actors.
///
/// Every call compares against the actor's current values and writes what differs; nothing is remembered between
/// calls. These writes do not depend on whether the override patch is enabled.
pub struct OverrideApplier<M> {
    /// Memory of the process the actors live in
    memory: Arc<M>,
    /// Number of rows in the action timeline sheet. Ids at or above this are never written.
    action_timeline_rows: u32,
}

impl<M: ProcessMemory> OverrideApplier<M> {
    /// Creates a new [`OverrideApplier`]
    pub fn new(memory: Arc<M>, action_timeline_rows: u32) -> Self {
        Self {
            memory,
            action_timeline_rows,
        }
    }

    /// Number of valid animation ids
    pub fn action_timeline_rows(&self) -> u32 {
        self.action_timeline_rows
    }

    /// Overrides the actor's animation.
    ///
    /// - `animation_speed` is written if it differs from the current speed. Any value is accepted.
    /// - `animation_id` is written if it differs from the current override and is a valid action timeline row.
    ///   Out-of-range ids are skipped without an error.
    /// - `interrupt` always writes `0` to the target animation.
    ///
    /// A failed write stops the remaining ones; writes that already happened stay in place.
    pub fn apply_override<A: Actor + ?Sized>(
        &self,
        actor: &A,
        animation_id: Option<u16>,
        animation_speed: Option<f32>,
        interrupt: bool,
    ) -> Result<(), MemoryError> {
        if let Some(speed) = animation_speed {
            if actor.animation_speed() != speed {
                self.write(actor, ActorField::AnimationSpeed, speed)?;
            }
        }

        if let Some(id) = animation_id {
            if actor.animation_override() != id {
                if u32::from(id) < self.action_timeline_rows {
                    self.write(actor, ActorField::AnimationOverride, id)?;
                } else {
                    debug!(
                        id,
                        rows = self.action_timeline_rows,
                        "animation id out of range, skipping override"
                    );
                }
            }
        }

        if interrupt {
            self.write(actor, ActorField::TargetAnimation, 0u16)?;
        }

        Ok(())
    }

    /// Clears the override, restores normal speed and interrupts the current animation
    pub fn reset_override<A: Actor + ?Sized>(&self, actor: &A) -> Result<(), MemoryError> {
        self.apply_override(
            actor,
            Some(RESET_ANIMATION_ID),
            Some(DEFAULT_ANIMATION_SPEED),
            true,
        )
    }

    /// Forces `action` onto the actor immediately, leaving its speed alone
    pub fn force_action<A: Actor + ?Sized>(
        &self,
        actor: &A,
        action: u16,
    ) -> Result<(), MemoryError> {
        self.apply_override(actor, Some(action), None, true)
    }

    /// Makes the actor draw its weapon
    pub fn draw_weapon<A: Actor + ?Sized>(&self, actor: &A) -> Result<(), MemoryError> {
        self.force_action(actor, DRAW_WEAPON_ANIMATION_ID)
    }

    /// Writes one field of the actor
    fn write<A: Actor + ?Sized, T: Primitive>(
        &self,
        actor: &A,
        field: ActorField,
        value: T,
    ) -> Result<(), MemoryError> {
        let address = actor.address_of(field);
        trace!(
            address = format_args!("{address:#x}"),
            value = ?value,
            "{}",
            field.purpose()
        );
        self.memory.write_value(address, value)
    }
}
