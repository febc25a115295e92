//! This module contains the byte store shared by every patch

use tracing::trace;

use crate::memory::{MemoryError, ProcessMemory};

use super::PatchTarget;

/// Value written to the last byte of the override patch to turn the override on
pub const OVERRIDE_SENTINEL: u8 = 0x02;

/// Original and replacement bytes for one [`PatchTarget`].
///
/// The original bytes are read from the live process exactly once, when the store is captured, and the store is
/// immutable from then on. Both sequences are always exactly `target.width()` bytes long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchStore {
    /// Location the bytes belong to
    target: PatchTarget,
    /// Bytes that were resident before any patching
    original: Vec<u8>,
    /// Bytes written while the patch is enabled
    replacement: Vec<u8>,
}

impl PatchStore {
    /// Captures the bytes at `target` and derives the override replacement by setting the last byte to
    /// [`OVERRIDE_SENTINEL`]
    pub fn capture<M: ProcessMemory>(memory: &M, target: PatchTarget) -> Result<Self, MemoryError> {
        Self::capture_with(memory, target, |original| {
            let mut replacement = original.to_vec();
            if let Some(last) = replacement.last_mut() {
                *last = OVERRIDE_SENTINEL;
            }
            replacement
        })
    }

    /// Captures the bytes at `target` and derives the replacement from them with `derive`.
    ///
    /// # Panics
    ///
    /// Panics if `derive` does not return exactly as many bytes as it was given.
    pub fn capture_with<M, F>(
        memory: &M,
        target: PatchTarget,
        derive: F,
    ) -> Result<Self, MemoryError>
    where
        M: ProcessMemory,
        F: FnOnce(&[u8]) -> Vec<u8>,
    {
        let mut original = vec![0u8; target.width()];
        memory.read(target.address(), &mut original)?;

        let replacement = derive(&original);
        assert_eq!(
            replacement.len(),
            original.len(),
            "replacement must cover exactly the patch width"
        );

        trace!(
            address = format_args!("{:#x}", target.address()),
            original = ?original,
            replacement = ?replacement,
            "captured patch bytes"
        );

        Ok(Self {
            target,
            original,
            replacement,
        })
    }

    /// Location the bytes belong to
    pub fn target(&self) -> PatchTarget {
        self.target
    }

    /// Bytes that were resident before any patching
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Bytes written while the patch is enabled
    pub fn replacement(&self) -> &[u8] {
        &self.replacement
    }

    /// Bytes that should be resident when the patch is `enabled`
    pub fn bytes(&self, enabled: bool) -> &[u8] {
        if enabled {
            &self.replacement
        } else {
            &self.original
        }
    }

    /// Writes the bytes matching `enabled` to the target
    pub fn write<M: ProcessMemory>(&self, memory: &M, enabled: bool) -> Result<(), MemoryError> {
        memory.write(self.target.address(), self.bytes(enabled))
    }
}
