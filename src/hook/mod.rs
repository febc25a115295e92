//! # Hook
//!
//! This module covers hooks, which neutralize an instruction slot and can be toggled independently of other patches

pub mod nop;

use crate::memory::MemoryError;
use crate::patcher::PatchTarget;

/// Trait for toggleable hooks
pub trait Hook {
    /// Location the hook patches
    fn target(&self) -> PatchTarget;

    /// Whether the hook bytes are currently resident
    fn is_enabled(&self) -> bool;

    /// Installs or removes the hook.
    ///
    /// Requesting the state the hook is already in must not touch memory. On failure the hook keeps reporting its
    /// previous state, so retrying is safe.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), MemoryError>;
}
