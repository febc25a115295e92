#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::missing_crate_level_docs)]
#![doc = include_str!("../README.md")]

pub mod actor;
pub mod animation;
pub mod code;
pub mod condition;
pub mod config;
pub mod hook;
pub mod memory;
pub mod patcher;
pub mod reactive;
pub mod service;

#[cfg(test)]
mod testing;

pub use service::AnimationService;
