//! Integration tests for `vimscriptuploader`
//!
//! Everything here runs in dry-run mode; nothing talks to www.vim.org.

use crate::helpers::{PluginWorkspace, run_uploader, uploader_status};
use anyhow::Result;

const DESCRIPTOR: &str = "id: '1863'\nversion: '1.05'\nmessage: |\n  - Fix bug\n  MD5 checksum: abc\nfile: tlib.vba\n";

#[test]
fn test_upload_dry_run_prints_descriptor() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("tlib.yml", DESCRIPTOR)?;

  let output = run_uploader(
    &ws.path,
    &["--dry-run", "--username", "tester", "--password", "secret", "tlib.yml"],
  )?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("1863"));
  assert!(stdout.contains("1.05"));
  assert!(stdout.contains("tlib.vba"));

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("scripts/add_script_version.php?script_id=1863"));
  assert!(stderr.contains("Login: tester:*********"));
  assert!(!stderr.contains("secret"));

  Ok(())
}

#[test]
fn test_upload_skips_missing_descriptor() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("tlib.yml", DESCRIPTOR)?;

  let output = run_uploader(
    &ws.path,
    &["-n", "--username", "tester", "--password", "secret", "missing.yml", "tlib.yml"],
  )?;

  assert!(String::from_utf8_lossy(&output.stdout).contains("1863"));
  assert!(String::from_utf8_lossy(&output.stderr).contains("missing.yml"));

  Ok(())
}

#[test]
fn test_upload_config_fills_gaps() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("tlib.yml", "version: '1.05'\nmessage: Fix bug\nfile: tlib.vba\n")?;
  ws.write_file(
    "uploader.yml",
    "username: tester\npassword: secret\ndry: true\nid: 1863\nsite: http://localhost:8080\n",
  )?;

  let output = run_uploader(&ws.path, &["-c", "uploader.yml", "tlib.yml"])?;

  assert!(String::from_utf8_lossy(&output.stdout).contains("1863"));
  assert!(
    String::from_utf8_lossy(&output.stderr)
      .contains("http://localhost:8080/scripts/add_script_version.php?script_id=1863")
  );

  Ok(())
}

#[test]
fn test_upload_without_descriptors_exits_5() -> Result<()> {
  let ws = PluginWorkspace::new()?;

  let output = uploader_status(&ws.path, &["-n", "--username", "tester", "--password", "secret"])?;
  assert_eq!(output.status.code(), Some(5));
  assert!(String::from_utf8_lossy(&output.stderr).contains("No yaml script definition given"));

  Ok(())
}

#[test]
fn test_upload_without_credentials_exits_5() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("tlib.yml", DESCRIPTOR)?;

  let output = uploader_status(&ws.path, &["-n", "tlib.yml"])?;
  assert_eq!(output.status.code(), Some(5));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(stderr.matches("Username or password is missing!").count(), 1, "{}", stderr);
  assert!(output.stdout.is_empty());

  Ok(())
}

#[test]
fn test_upload_missing_message_file_exits_5() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("tlib.yml", DESCRIPTOR)?;

  let output = uploader_status(&ws.path, &["-n", "--message-file", "missing.txt", "tlib.yml"])?;
  assert_eq!(output.status.code(), Some(5));

  Ok(())
}
