//! # Patcher
//!
//! This module covers patches, which capture the bytes at a location and swap it between those and a replacement

pub mod byte;
pub mod lifecycle;

use crate::memory::Address;

/// A fixed-width location in the patched process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchTarget {
    /// Start of the patched bytes
    address: Address,
    /// Number of bytes patched. Never changes after construction.
    width: usize,
}

impl PatchTarget {
    /// Creates a new [`PatchTarget`] covering `width` bytes from `address`
    pub fn new(address: Address, width: usize) -> Self {
        Self { address, width }
    }

    /// Start of the patched bytes
    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of bytes patched
    pub fn width(&self) -> usize {
        self.width
    }
}
