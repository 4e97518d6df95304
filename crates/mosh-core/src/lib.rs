//! MoSh Core - Foundational types for the MoSh playback engine
//!
//! This crate provides the types that all other MoSh crates depend on:
//! - `Vec3`, `Quat` - Spatial value types
//! - Error types and Result alias

mod error;
mod types;

pub use error::{MoshError, Result};
pub use types::{Quat, Vec3};
