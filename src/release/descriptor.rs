//! Release descriptor: the YAML file passed from the builder to the uploader
//!
//! ```yaml
//! id: '1863'
//! version: '1.05'
//! message: |-
//!   - Add feature
//!   MD5 checksum: 9f86d0...
//! file: tlib.vba
//! ```

use crate::core::error::{ConfigError, ExtractError, ReleaseError, ReleaseResult, ResultExt};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Fields required before a descriptor may be written or uploaded
pub const REQUIRED_FIELDS: [&str; 4] = ["id", "version", "message", "file"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
  /// Script ID on www.vim.org
  #[serde(default, deserialize_with = "deserialize_scalar")]
  pub id: Option<String>,
  #[serde(default, deserialize_with = "deserialize_scalar")]
  pub version: Option<String>,
  #[serde(default, deserialize_with = "deserialize_scalar")]
  pub message: Option<String>,
  #[serde(default, deserialize_with = "deserialize_scalar")]
  pub file: Option<String>,
}

/// Read a YAML scalar as text, so `id: 1863` and `id: '1863'` mean the same
///
/// Unquoted decimals are rejected: YAML reads `version: 1.10` as the float 1.1, and
/// the trailing zero cannot be recovered.
pub(crate) fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Null => Ok(None),
    Value::String(s) => Ok(Some(s)),
    Value::Bool(b) => Ok(Some(b.to_string())),
    Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
    Value::Number(n) => Err(D::Error::custom(format!(
      "unquoted decimal {} would lose digits; quote it (e.g. '1.10')",
      n
    ))),
    other => Err(D::Error::custom(format!("expected a scalar, found {:?}", other))),
  }
}

fn is_blank(field: &Option<String>) -> bool {
  field.as_deref().is_none_or(|v| v.trim().is_empty())
}

impl ReleaseDescriptor {
  /// Load a descriptor from a YAML file
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read descriptor {}", path.display()))?;
    Self::from_yaml(&content).map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })
  }

  /// Parse a descriptor; an empty document yields an empty descriptor
  pub fn from_yaml(content: &str) -> ReleaseResult<Self> {
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str::<Option<Self>>(content)?.unwrap_or_default())
  }

  pub fn to_yaml(&self) -> ReleaseResult<String> {
    Ok(serde_yaml::to_string(self)?)
  }

  /// Write the descriptor to `path`
  pub fn save(&self, path: &Path) -> ReleaseResult<()> {
    let yaml = self.to_yaml()?;
    fs::write(path, yaml).with_context(|| format!("Failed to write descriptor {}", path.display()))?;
    Ok(())
  }

  /// Write the descriptor to any writer (stdout)
  pub fn write_to(&self, mut out: impl Write) -> ReleaseResult<()> {
    out.write_all(self.to_yaml()?.as_bytes())?;
    out.flush()?;
    Ok(())
  }

  /// Names of required fields that are missing or empty
  pub fn missing_fields(&self) -> Vec<&'static str> {
    let fields = [&self.id, &self.version, &self.message, &self.file];
    REQUIRED_FIELDS
      .iter()
      .zip(fields)
      .filter(|(_, value)| is_blank(value))
      .map(|(name, _)| *name)
      .collect()
  }

  pub fn is_complete(&self) -> bool {
    self.missing_fields().is_empty()
  }

  /// Fail unless every required field is set
  pub fn ensure_complete(&self) -> ReleaseResult<()> {
    let missing = self.missing_fields();
    if missing.is_empty() {
      Ok(())
    } else {
      Err(ExtractError::IncompleteDescriptor { missing }.into())
    }
  }

  /// Numeric script ID, if the id is set, all digits, and non-zero
  pub fn numeric_id(&self) -> Option<u64> {
    let id = self.id.as_deref()?.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
      return None;
    }
    id.parse::<u64>().ok().filter(|n| *n != 0)
  }

  /// Fill fields this descriptor lacks from `defaults`
  pub fn or_defaults(mut self, defaults: &ReleaseDescriptor) -> Self {
    for (field, fallback) in [
      (&mut self.id, &defaults.id),
      (&mut self.version, &defaults.version),
      (&mut self.message, &defaults.message),
      (&mut self.file, &defaults.file),
    ] {
      if field.is_none() {
        field.clone_from(fallback);
      }
    }
    self
  }

  /// Take `id` from a freshly scanned value, checking it against the saved one
  ///
  /// A saved id survives when the sources no longer carry one. Two different ids
  /// mean the output file belongs to another plugin.
  pub fn merge_script_id(&mut self, scanned: Option<String>) -> ReleaseResult<()> {
    match (scanned, self.id.as_deref()) {
      (Some(found), Some(expected)) if found != expected => Err(
        ExtractError::ScriptIdMismatch {
          expected: expected.to_string(),
          found,
        }
        .into(),
      ),
      (Some(found), _) => {
        self.id = Some(found);
        Ok(())
      }
      (None, _) => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn complete() -> ReleaseDescriptor {
    ReleaseDescriptor {
      id: Some("1863".into()),
      version: Some("1.05".into()),
      message: Some("- Fix\nMD5 checksum: abc".into()),
      file: Some("tlib.vba".into()),
    }
  }

  #[test]
  fn test_complete_descriptor() {
    assert!(complete().is_complete());
    assert!(complete().ensure_complete().is_ok());
  }

  #[test]
  fn test_each_field_required() {
    for field in REQUIRED_FIELDS {
      let mut d = complete();
      match field {
        "id" => d.id = None,
        "version" => d.version = Some(String::new()),
        "message" => d.message = None,
        "file" => d.file = Some("  ".into()),
        _ => unreachable!(),
      }
      assert_eq!(d.missing_fields(), vec![field]);
      assert!(matches!(
        d.ensure_complete(),
        Err(ReleaseError::Extract(ExtractError::IncompleteDescriptor { .. }))
      ));
    }
  }

  #[test]
  fn test_numeric_id_from_yaml_integer() {
    let d = ReleaseDescriptor::from_yaml("id: 1863\nversion: '1.05'\n").unwrap();
    assert_eq!(d.id.as_deref(), Some("1863"));
    assert_eq!(d.numeric_id(), Some(1863));
  }

  #[test]
  fn test_unquoted_decimal_version_is_rejected() {
    let err = ReleaseDescriptor::from_yaml("version: 1.10\nfile: tlib.vba\n").unwrap_err();
    assert!(err.to_string().contains("quote it"), "{}", err);

    let d = ReleaseDescriptor::from_yaml("version: '1.10'\nfile: tlib.vba\n").unwrap();
    assert_eq!(d.version.as_deref(), Some("1.10"));
  }

  #[test]
  fn test_boolean_and_null_scalars() {
    let d = ReleaseDescriptor::from_yaml("id: ~\nmessage: true\n").unwrap();
    assert_eq!(d.id, None);
    assert_eq!(d.message.as_deref(), Some("true"));
    assert!(ReleaseDescriptor::from_yaml("file: [a, b]\n").is_err());
  }

  #[test]
  fn test_numeric_id_rejects_invalid() {
    let mut d = complete();
    d.id = Some("0".into());
    assert_eq!(d.numeric_id(), None);
    d.id = Some("12ab".into());
    assert_eq!(d.numeric_id(), None);
    d.id = None;
    assert_eq!(d.numeric_id(), None);
  }

  #[test]
  fn test_yaml_keeps_field_names() {
    let yaml = complete().to_yaml().unwrap();
    assert!(yaml.contains("id: '1863'"));
    assert!(yaml.contains("version: '1.05'"));
    assert!(yaml.contains("file: tlib.vba"));
    assert_eq!(ReleaseDescriptor::from_yaml(&yaml).unwrap(), complete());
  }

  #[test]
  fn test_empty_document() {
    assert_eq!(ReleaseDescriptor::from_yaml("").unwrap(), ReleaseDescriptor::default());
    assert_eq!(ReleaseDescriptor::from_yaml("---\n").unwrap(), ReleaseDescriptor::default());
  }

  #[test]
  fn test_or_defaults_keeps_descriptor_values() {
    let partial = ReleaseDescriptor {
      version: Some("2.00".into()),
      ..Default::default()
    };
    let merged = partial.or_defaults(&complete());
    assert_eq!(merged.version.as_deref(), Some("2.00"));
    assert_eq!(merged.id.as_deref(), Some("1863"));
  }

  #[test]
  fn test_merge_script_id() {
    let mut saved = complete();
    assert!(saved.merge_script_id(Some("1863".into())).is_ok());
    assert!(saved.merge_script_id(None).is_ok());
    assert_eq!(saved.id.as_deref(), Some("1863"));

    let err = saved.merge_script_id(Some("42".into())).unwrap_err();
    assert!(matches!(err, ReleaseError::Extract(ExtractError::ScriptIdMismatch { .. })));
    assert_eq!(saved.id.as_deref(), Some("1863"));

    let mut fresh = ReleaseDescriptor::default();
    fresh.merge_script_id(Some("7".into())).unwrap();
    assert_eq!(fresh.id.as_deref(), Some("7"));
  }
}
