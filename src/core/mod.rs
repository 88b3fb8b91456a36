//! Shared building blocks for both tools
//!
//! - **config**: typed configuration loaded from YAML and merged with CLI flags
//! - **error**: error types with help messages and exit codes
//! - **logging**: tracing setup and the injected logging context
//! - **vcs**: read-only git queries (SystemGit)

pub mod config;
pub mod error;
pub mod logging;
pub mod vcs;
