//! # Memory
//!
//! This module covers access to the memory of the process being patched.
//!
//! Everything else in the crate reads and writes through [`ProcessMemory`], so the same patches work whether the crate
//! is injected into the target ([`local::LocalMemory`]) or driving it from outside through some other backend.

pub mod local;

use std::fmt;
use std::mem;

use thiserror::Error;

/// Opaque address inside the patched process
pub type Address = usize;

/// Errors when accessing process memory
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The range could not be read (unmapped, guarded or not readable)
    #[error("failed to read {len} bytes at {address:#x}")]
    Read {
        /// Start of the range
        address: Address,
        /// Length of the range
        len: usize,
    },
    /// The range could not be written
    #[error("failed to write {len} bytes at {address:#x}")]
    Write {
        /// Start of the range
        address: Address,
        /// Length of the range
        len: usize,
    },
    /// Error when setting memory protections around a write
    #[error("failed to change memory protection at {address:#x}")]
    Protection {
        /// Start of the range whose protection was being changed
        address: Address,
        /// Underlying protection error
        #[source]
        source: region::Error,
    },
}

/// Read/write access to the memory of a process.
///
/// Implementations must be synchronous: a call returns once the bytes have been read or written, or fails.
pub trait ProcessMemory: Send + Sync {
    /// Fills `buf` with the bytes starting at `address`
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError>;

    /// Writes `bytes` starting at `address`
    fn write(&self, address: Address, bytes: &[u8]) -> Result<(), MemoryError>;

    /// Reads a single primitive value at `address`
    fn read_value<T: Primitive>(&self, address: Address) -> Result<T, MemoryError>
    where
        Self: Sized,
    {
        let mut buf = vec![0u8; T::SIZE];
        self.read(address, &mut buf)?;
        Ok(T::from_bytes(&buf))
    }

    /// Writes a single primitive value at `address`
    fn write_value<T: Primitive>(&self, address: Address, value: T) -> Result<(), MemoryError>
    where
        Self: Sized,
    {
        self.write(address, &value.to_bytes())
    }
}

/// Plain values that can be copied to and from process memory in native byte order
pub trait Primitive: Copy + PartialEq + fmt::Debug {
    /// Size of the value in bytes
    const SIZE: usize;

    /// Native-endian bytes of the value
    fn to_bytes(self) -> Vec<u8>;

    /// Rebuilds a value from the first [`Primitive::SIZE`] bytes of `bytes`.
    ///
    /// Panics if `bytes` is shorter than [`Primitive::SIZE`].
    fn from_bytes(bytes: &[u8]) -> Self;
}

/// Implements [`Primitive`] for the numeric types
macro_rules! primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = mem::size_of::<$ty>();

                fn to_bytes(self) -> Vec<u8> {
                    self.to_ne_bytes().to_vec()
                }

                fn from_bytes(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

primitive!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
