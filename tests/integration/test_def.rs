//! Integration tests for `vimscriptdef`

use crate::helpers::{PluginWorkspace, def_status, run_def};
use anyhow::Result;
use vimscript_release::release::ReleaseDescriptor;
use vimscript_release::release::changelog::checksum_line;

const BASIC_ARGS: &[&str] = &["-n", "tlib", "-a", "tlib.vba", "-o", "tlib.yml", "plugin/tlib.vim"];

#[test]
fn test_def_changelog_since_latest_tag() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.tag("v1")?;
  ws.commit("Old change")?;
  ws.tag("v2")?;
  ws.commit("Add feature")?;
  ws.commit("Fix bug")?;

  run_def(&ws.path, BASIC_ARGS)?;

  let descriptor = ReleaseDescriptor::from_yaml(&ws.read_file("tlib.yml")?)?;
  assert_eq!(descriptor.id.as_deref(), Some("1863"));
  assert_eq!(descriptor.version.as_deref(), Some("1.05"));
  assert_eq!(descriptor.file.as_deref(), Some("tlib.vba"));
  let expected = format!("- Add feature\n- Fix bug\n{}", checksum_line(&ws.path.join("tlib.vba"))?);
  assert_eq!(descriptor.message.as_deref(), Some(expected.as_str()));

  Ok(())
}

#[test]
fn test_def_config_ignores_messages() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.tag("v1")?;
  ws.commit("Merge branch 'topic'")?;
  ws.commit("Fix bug")?;
  ws.write_file(
    "vimscriptdef.yml",
    "name: tlib\narchive: tlib.vba\noutfile: tlib.yml\nfiles:\n  - plugin/tlib.vim\nignore_git_messages_rx: 'Merge branch'\n",
  )?;

  run_def(&ws.path, &["-c", "vimscriptdef.yml"])?;

  let descriptor = ReleaseDescriptor::from_yaml(&ws.read_file("tlib.yml")?)?;
  let message = descriptor.message.unwrap_or_default();
  assert!(message.starts_with("- Fix bug\nMD5 checksum: "), "message: {}", message);
  assert!(!message.contains("Merge"));

  Ok(())
}

#[test]
fn test_def_without_tags_uses_history_fmt() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("vimscriptdef.yml", "history_fmt: 'See :help %s-history'\n")?;

  let mut args = vec!["-c", "vimscriptdef.yml"];
  args.extend_from_slice(BASIC_ARGS);
  run_def(&ws.path, &args)?;

  let descriptor = ReleaseDescriptor::from_yaml(&ws.read_file("tlib.yml")?)?;
  assert!(
    descriptor
      .message
      .unwrap_or_default()
      .starts_with("See :help tlib-history\nMD5 checksum: ")
  );

  Ok(())
}

#[test]
fn test_def_writes_stdout() -> Result<()> {
  let ws = PluginWorkspace::new()?;

  let output = run_def(&ws.path, &["-n", "tlib", "-a", "tlib.vba", "-o", "-", "plugin/tlib.vim"])?;

  let descriptor = ReleaseDescriptor::from_yaml(&String::from_utf8(output.stdout)?)?;
  assert_eq!(descriptor.id.as_deref(), Some("1863"));
  assert!(!ws.file_exists("-"));

  Ok(())
}

#[test]
fn test_def_print_version() -> Result<()> {
  let ws = PluginWorkspace::new()?;

  let mut args = vec!["--print-version"];
  args.extend_from_slice(BASIC_ARGS);
  let output = run_def(&ws.path, &args)?;
  assert_eq!(String::from_utf8_lossy(&output.stdout), "1.05\n");
  assert!(!ws.file_exists("tlib.yml"));

  Ok(())
}

#[test]
fn test_def_print_saved_version() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("tlib.yml", "id: '1863'\nversion: '1.04'\n")?;

  let mut args = vec!["--print-saved-version"];
  args.extend_from_slice(BASIC_ARGS);
  let output = run_def(&ws.path, &args)?;
  assert_eq!(String::from_utf8_lossy(&output.stdout), "1.04\n");

  Ok(())
}

#[test]
fn test_def_recipe() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  ws.write_file("tlib.recipe", "plugin/tlib.vim\n\n")?;

  run_def(&ws.path, &["--recipe", "tlib.recipe"])?;

  let descriptor = ReleaseDescriptor::from_yaml(&ws.read_file("tlib.yml")?)?;
  assert_eq!(descriptor.version.as_deref(), Some("1.05"));
  assert_eq!(descriptor.file.as_deref(), Some("tlib.vba"));

  Ok(())
}

#[test]
fn test_def_id_mismatch_exits_5() -> Result<()> {
  let ws = PluginWorkspace::new()?;
  let saved = "id: '42'\nversion: '1.00'\n";
  ws.write_file("tlib.yml", saved)?;

  let output = def_status(&ws.path, BASIC_ARGS)?;
  assert_eq!(output.status.code(), Some(5));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(stderr.matches("Script ID mismatch: Expected 42 but got 1863").count(), 1, "{}", stderr);
  assert_eq!(ws.read_file("tlib.yml")?, saved);

  Ok(())
}

#[test]
fn test_def_missing_archive_exits_5() -> Result<()> {
  let ws = PluginWorkspace::new()?;

  let output = def_status(&ws.path, &["-n", "tlib", "-a", "missing.vba", "plugin/tlib.vim"])?;
  assert_eq!(output.status.code(), Some(5));
  assert!(!ws.file_exists("tlib.yml"));

  Ok(())
}

#[test]
fn test_def_missing_name_exits_5() -> Result<()> {
  let ws = PluginWorkspace::new()?;

  let output = def_status(&ws.path, &["-a", "tlib.vba", "plugin/tlib.vim"])?;
  assert_eq!(output.status.code(), Some(5));
  assert!(String::from_utf8_lossy(&output.stderr).contains("No name given"));

  Ok(())
}

#[test]
fn test_def_help_exits_1() -> Result<()> {
  let ws = PluginWorkspace::new()?;

  let output = def_status(&ws.path, &["--help"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stdout).contains("--print-saved-version"));

  Ok(())
}
