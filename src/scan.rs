//! Marker lines embedded in Vim plugin sources
//!
//! Two conventions identify a plugin release:
//!
//! ```text
//! " GetLatestVimScripts: 1234 1 :AutoInstall: myplugin.vim
//! let g:loaded_myplugin = 105
//! ```
//!
//! The first carries the script ID assigned by www.vim.org, the second encodes the
//! version as `major * 100 + minor`. The line parsers are pure; `find_*` walk files
//! in the order given and return the first hit.

use crate::core::error::{ReleaseResult, ResultExt};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Compiled marker patterns for one plugin name
#[derive(Debug, Clone)]
pub struct MarkerScanner {
  name: String,
  script_id: Regex,
  version: Regex,
}

impl MarkerScanner {
  pub fn new(name: &str) -> ReleaseResult<Self> {
    let escaped = regex::escape(name);
    let script_id = Regex::new(&format!(
      r#"^" GetLatestVimScripts: (\d+) +\d+ +(?::AutoInstall: +)?{}\.vim$"#,
      escaped
    ))?;
    let version = Regex::new(&format!(r"^let (?:g:)?loaded_{} = (\d+)$", escaped))?;
    Ok(Self {
      name: name.to_string(),
      script_id,
      version,
    })
  }

  /// Script ID on a `GetLatestVimScripts` line; an all-zero ID does not count
  pub fn parse_script_id(&self, line: &str) -> Option<String> {
    let caps = self.script_id.captures(chomp(line))?;
    let id = caps.get(1)?.as_str();
    if id.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
      Some(id.to_string())
    } else {
      None
    }
  }

  /// `MAJOR.MINOR` from a `let loaded_<name> = N` line
  pub fn parse_version(&self, line: &str) -> Option<String> {
    let caps = self.version.captures(chomp(line))?;
    let raw: u64 = caps.get(1)?.as_str().parse().ok()?;
    Some(format_version(raw))
  }

  /// First script ID found across `files`, in file-then-line order
  pub fn find_script_id(&self, files: &[PathBuf]) -> ReleaseResult<Option<String>> {
    tracing::debug!("Get script ID for {}", self.name);
    self.find_first(files, |line| self.parse_script_id(line))
  }

  /// First version found across `files`, in file-then-line order
  pub fn find_version(&self, files: &[PathBuf]) -> ReleaseResult<Option<String>> {
    tracing::debug!("Get version number for {}", self.name);
    self.find_first(files, |line| self.parse_version(line))
  }

  fn find_first<F>(&self, files: &[PathBuf], parse: F) -> ReleaseResult<Option<String>>
  where
    F: Fn(&str) -> Option<String>,
  {
    for file in files {
      tracing::debug!("Scanning {}", file.display());
      for line in read_lines(file)? {
        if let Some(found) = parse(&line) {
          tracing::debug!("{}: found {} in {}", self.name, found, file.display());
          return Ok(Some(found));
        }
      }
    }
    Ok(None)
  }
}

/// Render `major * 100 + minor` as `major.MM`
pub fn format_version(raw: u64) -> String {
  format!("{}.{:02}", raw / 100, raw % 100)
}

fn chomp(line: &str) -> &str {
  line.strip_suffix('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)).unwrap_or(line)
}

fn read_lines(path: &Path) -> ReleaseResult<Vec<String>> {
  let bytes = fs::read(path).with_context(|| format!("Failed to read source file {}", path.display()))?;
  Ok(String::from_utf8_lossy(&bytes).lines().map(String::from).collect())
}
