use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::release::descriptor::{ReleaseDescriptor, deserialize_scalar};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default site the uploader talks to
pub const DEFAULT_SITE: &str = "http://www.vim.org";

/// Redistribution format of the plugin archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
  Zip,
  #[default]
  Vba,
}

impl ArchiveFormat {
  pub fn extension(self) -> &'static str {
    match self {
      ArchiveFormat::Zip => "zip",
      ArchiveFormat::Vba => "vba",
    }
  }
}

/// Configuration for `vimscriptdef`
///
/// Loaded from the `--config` YAML file; flags given on the command line are applied
/// on top with [`DefConfig::apply_cli`].
///
/// ```yaml
/// dir: src/tlib
/// name: tlib
/// archive: tlib.vba
/// outfile: tlib.yml
/// files: [plugin/tlib.vim, autoload/tlib.vim]
/// ignore_git_messages_rx: "^- (Merge|wip)"
/// history_fmt: "See https://github.com/tomtom/%s_vim/commits/master"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefConfig {
  /// Working directory; relative paths are resolved against it (default: `.`)
  pub dir: PathBuf,
  /// Plugin distribution archive
  pub archive: Option<PathBuf>,
  /// Archive format, used to derive the archive name from a recipe (default: `vba`)
  pub format: ArchiveFormat,
  /// Plugin name as used in `loaded_<name>` and `<name>.vim`
  pub name: Option<String>,
  /// Where the descriptor is written; unset or `-` means stdout
  pub outfile: Option<PathBuf>,
  /// Source files scanned for marker lines
  pub files: Vec<PathBuf>,
  /// Vimball recipe listing the source files, one per line
  #[serde(skip)]
  pub recipe: Option<PathBuf>,
  /// Commit lines matching this pattern are left out of the version comment
  pub ignore_git_messages_rx: Option<String>,
  /// Fallback version comment when git yields nothing; `%s` is the plugin name
  pub history_fmt: Option<String>,
}

impl Default for DefConfig {
  fn default() -> Self {
    Self {
      dir: PathBuf::from("."),
      archive: None,
      format: ArchiveFormat::default(),
      name: None,
      outfile: None,
      files: Vec::new(),
      recipe: None,
      ignore_git_messages_rx: None,
      history_fmt: None,
    }
  }
}

/// `vimscriptdef` flags that override the config file
#[derive(Debug, Clone, Default)]
pub struct DefOverrides {
  pub dir: Option<PathBuf>,
  pub archive: Option<PathBuf>,
  pub format: Option<ArchiveFormat>,
  pub name: Option<String>,
  pub outfile: Option<PathBuf>,
  pub recipe: Option<PathBuf>,
  pub files: Vec<PathBuf>,
}

impl DefConfig {
  /// Load from `path`, or defaults when no config file was given
  pub fn load(path: Option<&Path>) -> ReleaseResult<Self> {
    match path {
      Some(path) => load_yaml(path),
      None => Ok(Self::default()),
    }
  }

  /// Apply command-line flags, then expand the recipe shortcut
  pub fn apply_cli(mut self, cli: DefOverrides) -> ReleaseResult<Self> {
    if let Some(dir) = cli.dir {
      if !dir.is_dir() {
        return Err(ConfigError::DirectoryNotFound { path: dir }.into());
      }
      self.dir = dir;
    }
    if cli.archive.is_some() {
      self.archive = cli.archive;
    }
    if let Some(format) = cli.format {
      self.format = format;
    }
    if cli.name.is_some() {
      self.name = cli.name;
    }
    if cli.outfile.is_some() {
      self.outfile = cli.outfile;
    }
    if cli.recipe.is_some() {
      self.recipe = cli.recipe;
    }

    if let Some(recipe) = self.recipe.clone() {
      self.expand_recipe(&recipe)?;
    } else if !cli.files.is_empty() {
      self.files = cli.files;
    }

    Ok(self)
  }

  /// Derive files, name, archive and outfile from a vimball recipe
  fn expand_recipe(&mut self, recipe: &Path) -> ReleaseResult<()> {
    let content = fs::read_to_string(recipe).map_err(|_| {
      ReleaseError::Config(ConfigError::MissingFile {
        what: "Recipe".to_string(),
        path: recipe.to_path_buf(),
      })
    })?;
    self.files = content
      .lines()
      .map(str::trim_end)
      .filter(|line| !line.is_empty())
      .map(PathBuf::from)
      .collect();

    let name = recipe
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .ok_or_else(|| ConfigError::InvalidArgument {
        message: format!("Cannot derive a plugin name from recipe {}", recipe.display()),
      })?;
    let parent = recipe.parent().unwrap_or(Path::new(""));

    if self.archive.is_none() {
      self.archive = Some(parent.join(format!("{}.{}", name, self.format.extension())));
    }
    if self.outfile.is_none() {
      self.outfile = Some(parent.join(format!("{}.yml", name)));
    }
    self.name = Some(name);
    Ok(())
  }

  /// Check the options every command needs
  pub fn validate(&self) -> ReleaseResult<()> {
    if !self.dir.is_dir() {
      return Err(ConfigError::DirectoryNotFound { path: self.dir.clone() }.into());
    }
    if self.name.as_deref().is_none_or(str::is_empty) {
      return Err(ConfigError::MissingOption { option: "name".into() }.into());
    }
    if self.files.is_empty() {
      return Err(ConfigError::MissingOption { option: "files".into() }.into());
    }
    let archive = self
      .archive
      .as_deref()
      .ok_or_else(|| ConfigError::MissingOption { option: "archive".into() })?;
    let resolved = self.resolve(archive);
    if !resolved.is_file() {
      return Err(
        ConfigError::MissingFile {
          what: "Distribution archive".to_string(),
          path: resolved,
        }
        .into(),
      );
    }
    Ok(())
  }

  /// Resolve a path against `dir`
  pub fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.dir.join(path)
    }
  }

  /// Output file, or `None` for stdout
  pub fn output_path(&self) -> Option<PathBuf> {
    self
      .outfile
      .as_deref()
      .filter(|p| p.as_os_str() != "-")
      .map(|p| self.resolve(p))
  }
}

/// Configuration for `vimscriptuploader`
///
/// `id`, `file`, `message` and `version` fill whatever a descriptor lacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
  #[serde(deserialize_with = "deserialize_scalar")]
  pub id: Option<String>,
  pub file: Option<String>,
  pub message: Option<String>,
  #[serde(deserialize_with = "deserialize_scalar")]
  pub version: Option<String>,
  pub username: Option<String>,
  #[serde(deserialize_with = "deserialize_scalar")]
  pub password: Option<String>,
  /// Print instead of talking to the site
  pub dry: bool,
  /// Base URL of the site (default: `http://www.vim.org`)
  pub site: String,
}

impl Default for UploadConfig {
  fn default() -> Self {
    Self {
      id: None,
      file: None,
      message: None,
      version: None,
      username: None,
      password: None,
      dry: false,
      site: DEFAULT_SITE.to_string(),
    }
  }
}

/// `vimscriptuploader` flags that override the config file
#[derive(Debug, Clone, Default)]
pub struct UploadOverrides {
  pub id: Option<String>,
  pub file: Option<String>,
  pub message: Option<String>,
  pub message_file: Option<PathBuf>,
  pub version: Option<String>,
  pub username: Option<String>,
  pub password: Option<String>,
  pub site: Option<String>,
  pub dry: Option<bool>,
}

impl UploadConfig {
  pub fn load(path: Option<&Path>) -> ReleaseResult<Self> {
    match path {
      Some(path) => load_yaml(path),
      None => Ok(Self::default()),
    }
  }

  pub fn apply_cli(mut self, cli: UploadOverrides) -> ReleaseResult<Self> {
    if cli.id.is_some() {
      self.id = cli.id;
    }
    if cli.file.is_some() {
      self.file = cli.file;
    }
    if cli.message.is_some() {
      self.message = cli.message;
    }
    if let Some(path) = cli.message_file {
      if !path.is_file() {
        return Err(
          ConfigError::MissingFile {
            what: "Message file".to_string(),
            path,
          }
          .into(),
        );
      }
      let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read message file {}", path.display()))?;
      self.message = Some(text);
    }
    if cli.version.is_some() {
      self.version = cli.version;
    }
    if cli.username.is_some() {
      self.username = cli.username;
    }
    if cli.password.is_some() {
      self.password = cli.password;
    }
    if let Some(site) = cli.site {
      self.site = site;
    }
    if let Some(dry) = cli.dry {
      self.dry = dry;
    }
    Ok(self)
  }

  /// Descriptor fields given through config or flags
  pub fn defaults(&self) -> ReleaseDescriptor {
    ReleaseDescriptor {
      id: self.id.clone(),
      version: self.version.clone(),
      message: self.message.clone(),
      file: self.file.clone(),
    }
  }

  /// Username and password, both present
  pub fn credentials(&self) -> Option<(&str, &str)> {
    match (self.username.as_deref(), self.password.as_deref()) {
      (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => Some((user, password)),
      _ => None,
    }
  }
}

fn load_yaml<T: DeserializeOwned + Default>(path: &Path) -> ReleaseResult<T> {
  if !path.is_file() {
    return Err(ConfigError::FileNotFound { path: path.to_path_buf() }.into());
  }
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read config from {}", path.display()))?;
  if content.trim().is_empty() {
    return Ok(T::default());
  }
  serde_yaml::from_str::<Option<T>>(&content)
    .map(Option::unwrap_or_default)
    .map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })
}
