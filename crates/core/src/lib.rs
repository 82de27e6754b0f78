//! MintGate Core Types
//!
//! This crate defines the fundamental data structures shared across the
//! MintGate workspace.

mod config;
mod types;

pub use config::*;
pub use types::*;
