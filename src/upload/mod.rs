//! Publishing release descriptors to www.vim.org
//!
//! - **form**: reads HTML forms off a page and builds their submissions
//! - **site**: the `SiteClient` seam and the reqwest-backed `VimOrgClient`
//! - **uploader**: login, per-descriptor upload, guaranteed logout

pub mod form;
pub mod site;
pub mod uploader;

pub use site::{SiteClient, UploadRequest, VimOrgClient};
pub use uploader::{UploadReport, Uploader};
