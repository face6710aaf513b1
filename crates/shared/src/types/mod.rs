//! Common types used across the engine.

pub mod code;
pub mod id;

pub use code::AccountCode;
pub use id::*;
