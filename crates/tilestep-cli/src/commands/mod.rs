//! CLI command implementations.

pub mod config;
pub mod extract;
pub mod presets;
pub mod serve;
pub mod stdio;
