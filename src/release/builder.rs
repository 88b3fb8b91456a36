//! Descriptor builder behind `vimscriptdef`
//!
//! Reads the plugin sources and the git history of the working directory, merges the
//! result into the previously saved descriptor and writes it back out.

use crate::core::config::DefConfig;
use crate::core::error::{ConfigError, ExtractError, ReleaseError, ReleaseResult};
use crate::core::logging::LogContext;
use crate::core::vcs::SystemGit;
use crate::release::changelog::{changelog_from_log, checksum_line, format_history, latest_tag};
use crate::release::descriptor::ReleaseDescriptor;
use crate::scan::MarkerScanner;
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

/// What `vimscriptdef` was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildCommand {
  /// Build and write the descriptor
  #[default]
  Write,
  /// Print the version found in the sources
  PrintVersion,
  /// Print the version stored in the output file
  PrintSavedVersion,
}

pub struct DescriptorBuilder {
  config: DefConfig,
  name: String,
  scanner: MarkerScanner,
  ignore: Option<Regex>,
  log: LogContext,
}

impl DescriptorBuilder {
  /// Validate `config` and prepare the marker patterns
  pub fn new(config: DefConfig, log: LogContext) -> ReleaseResult<Self> {
    config.validate()?;
    let name = config.name.clone().unwrap_or_default();
    let scanner = MarkerScanner::new(&name)?;
    let ignore = config
      .ignore_git_messages_rx
      .as_deref()
      .map(Regex::new)
      .transpose()
      .map_err(|e| {
        ReleaseError::Config(ConfigError::InvalidArgument {
          message: format!("Invalid ignore_git_messages_rx: {}", e),
        })
      })?;

    Ok(Self {
      config,
      name,
      scanner,
      ignore,
      log,
    })
  }

  /// Dispatch a command, writing reports and stdout descriptors to `out`
  pub fn run(&self, command: BuildCommand, mut out: impl Write) -> ReleaseResult<()> {
    match command {
      BuildCommand::PrintVersion => {
        writeln!(out, "{}", self.current_version()?)?;
      }
      BuildCommand::PrintSavedVersion => {
        if let Some(version) = self.saved_version()? {
          writeln!(out, "{}", version)?;
        }
      }
      BuildCommand::Write => {
        let descriptor = self.build()?;
        match self.config.output_path() {
          Some(path) => {
            descriptor.save(&path)?;
            tracing::info!("Wrote {}", path.display());
          }
          None => descriptor.write_to(out)?,
        }
      }
    }
    Ok(())
  }

  /// Version from the `loaded_<name>` line
  pub fn current_version(&self) -> ReleaseResult<String> {
    match self.scanner.find_version(&self.source_files())? {
      Some(version) => {
        tracing::debug!("Version number is {}", version);
        Ok(version)
      }
      None => Err(ExtractError::VersionNotFound { name: self.name.clone() }.into()),
    }
  }

  /// Version recorded in the output file, if it exists
  pub fn saved_version(&self) -> ReleaseResult<Option<String>> {
    Ok(self.saved_descriptor()?.and_then(|d| d.version))
  }

  /// Build the descriptor without writing it
  pub fn build(&self) -> ReleaseResult<ReleaseDescriptor> {
    let span = self.log.span("build");
    let _enter = span.enter();

    let mut descriptor = self.saved_descriptor()?.unwrap_or_default();

    let scanned = self.scanner.find_script_id(&self.source_files())?;
    match &scanned {
      Some(id) => tracing::debug!("{}: Script ID is #{}", self.name, id),
      None => tracing::error!("No Script ID found"),
    }
    descriptor.merge_script_id(scanned)?;

    descriptor.version = Some(self.current_version()?);

    let mut message = self.changelog()?;
    message.push_str(&checksum_line(&self.archive_path())?);
    descriptor.message = Some(message);

    descriptor.file = self.config.archive.as_ref().map(|p| p.to_string_lossy().into_owned());

    descriptor.ensure_complete()?;
    Ok(descriptor)
  }

  /// Version comment without the checksum trailer
  ///
  /// Commits since the highest tag when the working directory is a git checkout,
  /// else `history_fmt`, else empty.
  pub fn changelog(&self) -> ReleaseResult<String> {
    if let Some(changes) = self.git_changes()? {
      return Ok(changes);
    }
    Ok(match self.config.history_fmt.as_deref() {
      Some(fmt) => {
        let mut message = format_history(fmt, &self.name);
        message.push('\n');
        message
      }
      None => String::new(),
    })
  }

  fn git_changes(&self) -> ReleaseResult<Option<String>> {
    if !self.config.dir.join(".git").exists() {
      return Ok(None);
    }
    let git = SystemGit::open(&self.config.dir)?;
    tracing::debug!("Reading tags from {}", git.work_tree().display());
    let Some(tag) = latest_tag(&git.list_tags()?) else {
      return Ok(None);
    };
    let log = git.log_oneline_since(&tag)?;
    Ok(changelog_from_log(&log, self.ignore.as_ref()))
  }

  fn saved_descriptor(&self) -> ReleaseResult<Option<ReleaseDescriptor>> {
    match self.config.output_path() {
      Some(path) if path.is_file() => Ok(Some(ReleaseDescriptor::load(&path)?)),
      _ => Ok(None),
    }
  }

  fn source_files(&self) -> Vec<PathBuf> {
    self.config.files.iter().map(|f| self.config.resolve(f)).collect()
  }

  fn archive_path(&self) -> PathBuf {
    // validate() guarantees the archive is set
    self
      .config
      .archive
      .as_deref()
      .map(|p| self.config.resolve(p))
      .unwrap_or_default()
  }
}
