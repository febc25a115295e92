//! This module contains the lifecycle of the animation override patch: the override bytes and the speed hook, toggled
//! together behind a single enabled flag

use std::sync::Arc;

use tracing::{info, warn};

use crate::hook::nop::NopHook;
use crate::hook::Hook;
use crate::memory::{Address, MemoryError, ProcessMemory};

use super::byte::PatchStore;
use super::PatchTarget;

/// Owns the override patch and the speed hook and keeps them in step.
///
/// While `enabled` is `true` the override replacement is resident at the patch target, and while it is `false` the
/// original bytes are. This only holds as long as nothing else writes to the target.
///
/// There is no internal locking: callers must serialize calls to [`PatchLifecycle::set_enabled`].
pub struct PatchLifecycle<M> {
    /// Memory of the patched process
    memory: Arc<M>,
    /// Override patch bytes
    store: PatchStore,
    /// Hook toggled alongside the override patch
    hook: NopHook<M>,
    /// Whether both patches were last written successfully in the enabled state
    enabled: bool,
}

impl<M: ProcessMemory> PatchLifecycle<M> {
    /// Captures the override patch at `patch` and the hook slot at `hook`.
    ///
    /// Nothing is written and the lifecycle starts disabled; choosing the initial state is left to the caller.
    pub fn start(memory: Arc<M>, patch: PatchTarget, hook: Address) -> Result<Self, MemoryError> {
        let store = PatchStore::capture(&*memory, patch)?;
        let hook = NopHook::new(Arc::clone(&memory), hook)?;

        info!(
            patch = format_args!("{:#x}", patch.address()),
            hook = format_args!("{:#x}", hook.target().address()),
            "captured animation override patch"
        );

        Ok(Self {
            memory,
            store,
            hook,
            enabled: false,
        })
    }

    /// Whether the override is currently applied
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Override patch bytes
    pub fn store(&self) -> &PatchStore {
        &self.store
    }

    /// Hook toggled alongside the override patch
    pub fn hook(&self) -> &NopHook<M> {
        &self.hook
    }

    /// Applies or reverts the override.
    ///
    /// The hook is toggled first, then the override bytes are written, and the enabled flag only changes once both
    /// writes succeeded. A failure in the second write leaves the hook toggled while the flag keeps its old value;
    /// this half-applied state is not rolled back, and later calls requesting the current flag value leave it in
    /// place. Only [`PatchLifecycle::shutdown`] restores such a hook.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), MemoryError> {
        if self.enabled == enabled {
            return Ok(());
        }

        self.hook.set_enabled(enabled)?;
        self.store.write(&*self.memory, enabled)?;
        self.enabled = enabled;

        info!(enabled, "toggled animation override");
        Ok(())
    }

    /// Reverts the override before teardown.
    ///
    /// A hook left toggled by a half-applied [`PatchLifecycle::set_enabled`] is restored as well; the hook tracks its
    /// own state, so only the slot it actually changed is written.
    ///
    /// Failures are logged and returned, but never panic, so the caller can always finish tearing down.
    pub fn shutdown(&mut self) -> Result<(), MemoryError> {
        let result = self
            .set_enabled(false)
            .and_then(|()| self.hook.set_enabled(false));
        result.map_err(|err| {
            warn!(error = %err, "failed to restore animation override patch");
            err
        })
    }
}
