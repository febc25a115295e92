//! # NOP Hook
//!
//! This hook type overwrites an instruction slot with NOPs

use std::sync::Arc;

use tracing::{debug, trace};

use crate::code::x64;
use crate::memory::{Address, MemoryError, ProcessMemory};
use crate::patcher::byte::PatchStore;
use crate::patcher::PatchTarget;

use super::Hook;

/// Width of the instruction slot covered by a [`NopHook`]
pub const NOP_HOOK_WIDTH: usize = 9;

/// Hook that replaces [`NOP_HOOK_WIDTH`] bytes of code with NOPs
pub struct NopHook<M> {
    /// Memory of the hooked process
    memory: Arc<M>,
    /// Captured slot bytes and their NOP replacement
    store: PatchStore,
    /// Whether the NOPs are currently resident
    enabled: bool,
}

impl<M: ProcessMemory> NopHook<M> {
    /// Captures the instruction slot at `address`. The hook starts disabled and nothing is written.
    pub fn new(memory: Arc<M>, address: Address) -> Result<Self, MemoryError> {
        let target = PatchTarget::new(address, NOP_HOOK_WIDTH);
        let store =
            PatchStore::capture_with(&*memory, target, |original| x64::nop(original.len()))?;

        trace!(
            address = format_args!("{address:#x}"),
            instructions = ?x64::disassemble(address, store.original()),
            "captured hook slot"
        );

        Ok(Self {
            memory,
            store,
            enabled: false,
        })
    }

    /// Captured slot bytes and their NOP replacement
    pub fn store(&self) -> &PatchStore {
        &self.store
    }
}

impl<M: ProcessMemory> Hook for NopHook<M> {
    fn target(&self) -> PatchTarget {
        self.store.target()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), MemoryError> {
        if self.enabled == enabled {
            return Ok(());
        }

        self.store.write(&*self.memory, enabled)?;
        self.enabled = enabled;

        debug!(
            address = format_args!("{:#x}", self.store.target().address()),
            enabled,
            "toggled nop hook"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::code::x64::nop;
    use crate::hook::nop::{NopHook, NOP_HOOK_WIDTH};
    use crate::hook::Hook;
    use crate::testing::RecordingMemory;

    /// movss [rbx+0x4c], xmm0 followed by a nop; 9 bytes of instructions
    const SLOT: [u8; 9] = [0xf3, 0x0f, 0x11, 0x43, 0x4c, 0x0f, 0x1f, 0x40, 0x00];

    fn hooked() -> (Arc<RecordingMemory>, NopHook<RecordingMemory>) {
        let memory = Arc::new(RecordingMemory::with_bytes(0x2000, &SLOT));
        let hook = NopHook::new(Arc::clone(&memory), 0x2000).unwrap();
        (memory, hook)
    }

    #[test]
    /// Test hook and revert functionality
    fn test_hook() {
        let (memory, mut hook) = hooked();

        // sanity check
        assert!(!hook.is_enabled());
        assert_eq!(hook.target().width(), NOP_HOOK_WIDTH);
        assert!(memory.writes().is_empty());

        hook.set_enabled(true).unwrap();
        assert!(hook.is_enabled());
        assert_eq!(memory.peek(0x2000, NOP_HOOK_WIDTH), nop(NOP_HOOK_WIDTH));

        hook.set_enabled(false).unwrap();
        assert!(!hook.is_enabled());
        assert_eq!(memory.peek(0x2000, NOP_HOOK_WIDTH), SLOT);
    }

    #[test]
    /// Requesting the current state never writes
    fn test_idempotent() {
        let (memory, mut hook) = hooked();

        hook.set_enabled(false).unwrap();
        assert_eq!(memory.writes_to(0x2000), 0);

        hook.set_enabled(true).unwrap();
        hook.set_enabled(true).unwrap();
        assert_eq!(memory.writes_to(0x2000), 1);
    }

    #[test]
    /// A failed write keeps the previous state so the toggle can be retried
    fn test_failed_write() {
        let (memory, mut hook) = hooked();

        memory.fail_writes(true);
        assert!(hook.set_enabled(true).is_err());
        assert!(!hook.is_enabled());

        memory.fail_writes(false);
        hook.set_enabled(true).unwrap();
        assert!(hook.is_enabled());
        assert_eq!(memory.writes_to(0x2000), 1);
    }
}
