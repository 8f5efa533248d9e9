//! Small helpers shared across the workspace: env-file loading and configuration errors.

pub mod config;
pub mod env;
