//! This module contains a memory backend for the current process, used when the crate runs injected into the target

use std::ptr;

use region::Protection;

use super::{Address, MemoryError, ProcessMemory};

/// Memory access for the process this crate is loaded into.
///
/// Reads are validated against the page map first so that unmapped or unreadable ranges come back as
/// [`MemoryError::Read`] instead of faulting. Writes temporarily make the target pages writable, which is what allows
/// patching code in read-only sections, and restore the previous protection afterwards.
#[derive(Debug, Clone, Copy)]
pub struct LocalMemory {
    /// Only constructible through [`LocalMemory::new`]
    _private: (),
}

impl LocalMemory {
    /// Creates a new [`LocalMemory`]
    ///
    /// # Safety
    ///
    /// Every address handed to this backend is treated as raw process memory.
    /// The caller must ensure that the addresses passed to [`ProcessMemory::write`] are not memory tracked by Rust
    /// (or that changing it behind Rust's back cannot trigger undefined behavior), and that no other thread is
    /// executing the code being written while a write is in progress.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }

    /// Checks that the full range is mapped, readable and not guarded
    fn is_readable(address: Address, len: usize) -> bool {
        let end = match address.checked_add(len) {
            Some(end) => end,
            None => return false,
        };
        let regions = match region::query_range(address as *const u8, len) {
            Ok(regions) => regions,
            Err(_) => return false,
        };

        // regions come back in ascending order, so any gap between them is unmapped memory
        let mut cursor = address;
        for region in regions {
            let region = match region {
                Ok(region) => region,
                Err(_) => return false,
            };
            let range = region.as_range();
            if range.start > cursor
                || region.is_guarded()
                || !region.protection().contains(Protection::READ)
            {
                return false;
            }
            cursor = cursor.max(range.end);
            if cursor >= end {
                return true;
            }
        }
        cursor >= end
    }
}

impl ProcessMemory for LocalMemory {
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
        if buf.is_empty() {
            return Ok(());
        }
        if !Self::is_readable(address, buf.len()) {
            return Err(MemoryError::Read {
                address,
                len: buf.len(),
            });
        }

        // Safety: the range was just checked to be mapped and readable for the full length of `buf`
        unsafe {
            ptr::copy(address as *const u8, buf.as_mut_ptr(), buf.len());
        }
        Ok(())
    }

    fn write(&self, address: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        if bytes.is_empty() {
            return Ok(());
        }

        // Safety: the creator of `LocalMemory` guarantees the address is safe to modify; the handle restores the
        // original protection when dropped
        let _guard = unsafe {
            region::protect_with_handle(address as *const u8, bytes.len(), Protection::all())
        }
        .map_err(|source| MemoryError::Protection { address, source })?;

        // Safety: the pages were made writable for the full length of the patch above
        unsafe {
            ptr::copy(bytes.as_ptr(), address as *mut u8, bytes.len());
        }
        Ok(())
    }
}
