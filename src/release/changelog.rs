//! Version comment generation from git tags and one-line logs
//!
//! The message is the list of commits since the highest tag, oldest first, each
//! prefixed with `- `. Whatever the message ends up being, it is closed by the
//! archive's checksum line.

use crate::core::error::{ReleaseResult, ResultExt};
use regex::Regex;
use md5::{Digest, Md5};
use std::cmp::Ordering;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

static NUMERIC_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v?(\d+)$").expect("valid regex"));
// Leading float: the integer part is optional and `_` may separate digits
static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\s*[+-]?(?:\d+(?:_\d+)*(?:\.\d+(?:_\d+)*)?|\.\d+(?:_\d+)*)(?:[eE][+-]?\d+(?:_\d+)*)?")
    .expect("valid regex")
});
static LEADING_HASH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+").expect("valid regex"));

/// Sort value of a tag
///
/// `v?<digits>` tags count in hundredths (`v105` is 1.05, matching the
/// `loaded_<name>` encoding). Anything else is read as a leading float, or 0.
pub fn tag_value(tag: &str) -> f64 {
  if let Some(caps) = NUMERIC_TAG.captures(tag) {
    return caps[1].parse::<f64>().unwrap_or(0.0) / 100.0;
  }
  FLOAT_PREFIX
    .find(tag)
    .and_then(|m| m.as_str().trim_start().replace('_', "").parse::<f64>().ok())
    .unwrap_or(0.0)
}

/// Tag order: by value, and by name when both values are zero
///
/// Equivalent to sorting on the key `(value, name if value == 0)`, so it is a total
/// preorder and safe for `sort_by`.
pub fn compare_tags(a: &str, b: &str) -> Ordering {
  let av = tag_value(a);
  let bv = tag_value(b);
  if av == 0.0 && bv == 0.0 {
    a.cmp(b)
  } else {
    av.partial_cmp(&bv).unwrap_or(Ordering::Equal)
  }
}

/// Sort tags in place, lowest first
pub fn sort_tags(tags: &mut [String]) {
  tags.sort_by(|a, b| compare_tags(a, b));
}

/// The highest tag, if any
pub fn latest_tag(tags: &[String]) -> Option<String> {
  let mut sorted = tags.to_vec();
  sort_tags(&mut sorted);
  sorted.pop()
}

/// Turn `git log --oneline` output (newest first) into the version comment body
///
/// The hash of each line becomes `-`, the order is reversed, and lines matching
/// `ignore` are dropped. Returns `None` when nothing is left.
pub fn changelog_from_log(lines: &[String], ignore: Option<&Regex>) -> Option<String> {
  let changes: Vec<String> = lines
    .iter()
    .rev()
    .map(|line| LEADING_HASH.replace(line, "-").into_owned())
    .filter(|line| ignore.is_none_or(|rx| !rx.is_match(line)))
    .collect();

  if changes.is_empty() {
    return None;
  }

  let mut message = changes.join("\n");
  message.push('\n');
  Some(message)
}

/// printf-style `%s` substitution of the plugin name into `history_fmt`
pub fn format_history(fmt: &str, name: &str) -> String {
  let mut out = String::with_capacity(fmt.len() + name.len());
  let mut chars = fmt.chars().peekable();
  while let Some(c) = chars.next() {
    if c == '%' {
      match chars.peek() {
        Some('s') => {
          chars.next();
          out.push_str(name);
          continue;
        }
        Some('%') => {
          chars.next();
          out.push('%');
          continue;
        }
        _ => {}
      }
    }
    out.push(c);
  }
  out
}

/// Hex MD5 of a file, streamed
pub fn archive_digest(path: &Path) -> ReleaseResult<String> {
  let mut file = File::open(path).with_context(|| format!("Failed to open archive {}", path.display()))?;
  let mut hasher = Md5::new();
  io::copy(&mut file, &mut hasher).with_context(|| format!("Failed to read archive {}", path.display()))?;
  Ok(format!("{:x}", hasher.finalize()))
}

/// Trailer line appended to every version comment
pub fn checksum_line(path: &Path) -> ReleaseResult<String> {
  Ok(format!("MD5 checksum: {}", archive_digest(path)?))
}
