//! Release tooling for Vim plugins hosted on www.vim.org
//!
//! Two binaries share this library:
//!
//! - `vimscriptdef` builds a release descriptor (script ID, version, version comment,
//!   archive path) from plugin sources, git tags and the release archive.
//! - `vimscriptuploader` logs in to the site and publishes one or more descriptors.
//!
//! The descriptor YAML file is the only thing passed between them.

pub mod cli;
pub mod core;
pub mod release;
pub mod scan;
pub mod upload;
