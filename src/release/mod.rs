//! Release descriptors for Vim plugins
//!
//! - **descriptor**: the YAML record handed from `vimscriptdef` to `vimscriptuploader`
//! - **changelog**: tag ordering, version comment text and the checksum trailer
//! - **builder**: scans sources and git history and writes the descriptor

pub mod builder;
pub mod changelog;
pub mod descriptor;

pub use builder::{BuildCommand, DescriptorBuilder};
pub use descriptor::ReleaseDescriptor;
