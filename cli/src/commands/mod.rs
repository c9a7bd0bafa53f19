//! Command implementations

pub mod acquire;
pub mod targets;
pub mod version;
