//! Error types for vimscript-release with contextual messages and exit codes
//!
//! Every failure that ends the process is a `ReleaseError`. The variant decides the
//! exit status: configuration and extraction problems exit with 5, transport and
//! unexpected failures exit with 1.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for the builder and uploader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Unexpected failure (git, network, I/O), also used after printing help
  Failure = 1,
  /// Configuration or validation failure
  Config = 5,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for vimscript-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Script ID / version extraction and descriptor validation errors
  Extract(ExtractError),

  /// Git operation errors
  Git(GitError),

  /// HTTP transport errors
  Http(reqwest::Error),

  /// HTML form errors
  Form(FormError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: ctx_str,
        context: Some(err.to_string()),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::Config,
      ReleaseError::Extract(_) => ExitCode::Config,
      ReleaseError::Git(_) => ExitCode::Failure,
      ReleaseError::Http(_) => ExitCode::Failure,
      ReleaseError::Form(_) => ExitCode::Failure,
      ReleaseError::Io(_) => ExitCode::Failure,
      ReleaseError::Message { .. } => ExitCode::Failure,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Extract(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Extract(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Http(e) => write!(f, "HTTP error: {}", e),
      ReleaseError::Form(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Http(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<ExtractError> for ReleaseError {
  fn from(err: ExtractError) -> Self {
    ReleaseError::Extract(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<FormError> for ReleaseError {
  fn from(err: FormError) -> Self {
    ReleaseError::Form(err)
  }
}

impl From<reqwest::Error> for ReleaseError {
  fn from(err: reqwest::Error) -> Self {
    ReleaseError::Http(err)
  }
}

impl From<serde_yaml::Error> for ReleaseError {
  fn from(err: serde_yaml::Error) -> Self {
    ReleaseError::message(format!("YAML error: {}", err))
  }
}

impl From<regex::Error> for ReleaseError {
  fn from(err: regex::Error) -> Self {
    ReleaseError::message(format!("Regex error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file given on the command line does not exist
  FileNotFound { path: PathBuf },

  /// Config file could not be parsed
  Invalid { path: PathBuf, reason: String },

  /// Required option missing after merging config file and CLI
  MissingOption { option: String },

  /// A file named by an option does not exist
  MissingFile { what: String, path: PathBuf },

  /// `--dir` does not name a directory
  DirectoryNotFound { path: PathBuf },

  /// Malformed command line or option value
  InvalidArgument { message: String },

  /// Username or password missing for the uploader
  MissingCredentials,

  /// The uploader was started without descriptor files
  NoDescriptors,
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingOption { option } => Some(format!(
        "Pass --{} on the command line or set `{}` in the config file.",
        option, option
      )),
      ConfigError::MissingCredentials => {
        Some("Pass --username and --password or set them in the config file.".to_string())
      }
      ConfigError::NoDescriptors => Some("Pass one or more descriptor files, e.g. `myplugin.yml`.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::FileNotFound { path } => {
        write!(f, "Configuration file not found: {}", path.display())
      }
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration file {}: {}", path.display(), reason)
      }
      ConfigError::MissingOption { option } => write!(f, "No {} given", option),
      ConfigError::MissingFile { what, path } => {
        write!(f, "{} does not exist: {}", what, path.display())
      }
      ConfigError::DirectoryNotFound { path } => {
        write!(f, "Directory not found: {}", path.display())
      }
      ConfigError::InvalidArgument { message } => write!(f, "{}", message),
      ConfigError::MissingCredentials => write!(f, "Username or password is missing!"),
      ConfigError::NoDescriptors => write!(f, "No yaml script definition given"),
    }
  }
}

/// Errors raised while deriving a release descriptor
#[derive(Debug)]
pub enum ExtractError {
  /// No `let loaded_<name> = N` line in any source file
  VersionNotFound { name: String },

  /// Extracted script ID differs from the one in the saved descriptor
  ScriptIdMismatch { expected: String, found: String },

  /// Some descriptor field is still missing or empty
  IncompleteDescriptor { missing: Vec<&'static str> },
}

impl ExtractError {
  fn help_message(&self) -> Option<String> {
    match self {
      ExtractError::VersionNotFound { name } => Some(format!(
        "Add a line like `let loaded_{} = 100` to one of the source files.",
        name
      )),
      ExtractError::ScriptIdMismatch { .. } => {
        Some("Check that the output file belongs to this plugin; it was left untouched.".to_string())
      }
      ExtractError::IncompleteDescriptor { missing } if missing.contains(&"id") => Some(
        "Add a `\" GetLatestVimScripts: <id> <id> <name>.vim` line to one of the source files.".to_string(),
      ),
      ExtractError::IncompleteDescriptor { .. } => None,
    }
  }
}

impl fmt::Display for ExtractError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ExtractError::VersionNotFound { name } => {
        write!(f, "Cannot find version number for {}", name)
      }
      ExtractError::ScriptIdMismatch { expected, found } => {
        write!(f, "Script ID mismatch: Expected {} but got {}", expected, found)
      }
      ExtractError::IncompleteDescriptor { missing } => {
        write!(f, "Incomplete script definition (missing: {})", missing.join(", "))
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// HTML form errors
#[derive(Debug)]
pub enum FormError {
  /// No form with that name on the page
  FormNotFound { name: String, url: String },

  /// The form has no control with that name
  FieldNotFound { form: String, field: String },

  /// The form has no file input to attach the archive to
  NoFileInput { form: String },

  /// The form action could not be resolved against the page URL
  BadAction { action: String, reason: String },
}

impl fmt::Display for FormError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FormError::FormNotFound { name, url } => write!(f, "Form '{}' not found on {}", name, url),
      FormError::FieldNotFound { form, field } => {
        write!(f, "Form '{}' has no field '{}'", form, field)
      }
      FormError::NoFileInput { form } => write!(f, "Form '{}' has no file upload field", form),
      FormError::BadAction { action, reason } => {
        write!(f, "Invalid form action '{}': {}", action, reason)
      }
    }
  }
}

/// Result type alias for vimscript-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
