//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const PLUGIN_SOURCE: &str = r#"" tlib.vim
" @Author:      Test Author
" GetLatestVimScripts: 1863 1 :AutoInstall: tlib.vim

if &cp || exists("loaded_tlib")
    finish
endif
let loaded_tlib = 105
"#;

/// A plugin checkout with git history
pub struct PluginWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl PluginWorkspace {
  /// Create a git repo holding `plugin/tlib.vim` and its `tlib.vba` archive
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::create_dir_all(path.join("plugin"))?;
    std::fs::write(path.join("plugin/tlib.vim"), PLUGIN_SOURCE)?;
    std::fs::write(path.join("tlib.vba"), "\" Vimball Archiver by Charles E. Campbell\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial import"])?;

    Ok(Self { _root: root, path })
  }

  /// Create an empty commit
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["commit", "--allow-empty", "-m", message])?;
    Ok(())
  }

  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run one of the binaries and return its output whatever the exit status
pub fn run_tool(bin: &str, cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .with_context(|| format!("Failed to run {}", bin))
}

fn expect_success(name: &str, args: &[&str], output: Output) -> Result<Output> {
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "{} failed: {} {}\nstdout: {}\nstderr: {}",
      name,
      name,
      args.join(" "),
      stdout,
      stderr
    );
  }
  Ok(output)
}

/// Run vimscriptdef, failing on a non-zero exit
pub fn run_def(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_tool(env!("CARGO_BIN_EXE_vimscriptdef"), cwd, args)?;
  expect_success("vimscriptdef", args, output)
}

/// Run vimscriptuploader, failing on a non-zero exit
pub fn run_uploader(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_tool(env!("CARGO_BIN_EXE_vimscriptuploader"), cwd, args)?;
  expect_success("vimscriptuploader", args, output)
}

pub fn def_status(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_tool(env!("CARGO_BIN_EXE_vimscriptdef"), cwd, args)
}

pub fn uploader_status(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_tool(env!("CARGO_BIN_EXE_vimscriptuploader"), cwd, args)
}
