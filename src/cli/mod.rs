//! CLI command implementations

pub mod daemon;
