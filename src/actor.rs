//! # Actor
//!
//! Actors are entities inside the target process with animation fields this crate overrides.
//! Where those fields live is owned by the caller; this crate only asks for their addresses and current values.

use crate::memory::Address;

/// Animation fields of an actor that can be overridden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorField {
    /// Playback speed of the current animation (`f32`)
    AnimationSpeed,
    /// Animation id forced onto the actor (`u16`)
    AnimationOverride,
    /// Animation the actor is transitioning to (`u16`). Writing `0` interrupts it.
    TargetAnimation,
}

impl ActorField {
    /// Short description of what a write to this field does, used when logging writes
    pub fn purpose(self) -> &'static str {
        match self {
            Self::AnimationSpeed => "animation speed override",
            Self::AnimationOverride => "animation id override",
            Self::TargetAnimation => "animation interrupt",
        }
    }
}

/// An actor living in the patched process
pub trait Actor {
    /// Address of `field` inside the patched process
    fn address_of(&self, field: ActorField) -> Address;
    /// Current animation speed
    fn animation_speed(&self) -> f32;
    /// Current animation override id
    fn animation_override(&self) -> u16;
    /// Current target animation id
    fn target_animation(&self) -> u16;
}
