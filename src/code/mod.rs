//! # Code
//!
//! Machine code helpers for the architectures patched by this crate

pub mod x64;
