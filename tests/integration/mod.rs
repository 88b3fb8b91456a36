//! Integration tests for `vimscriptdef` and `vimscriptuploader`

mod helpers;
mod test_def;
mod test_upload;
