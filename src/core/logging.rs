//! Logging setup and the context handed to each component
//!
//! Nothing reads verbosity from global flags. `init` installs the subscriber once and
//! returns a [`LogContext`]; the builder and uploader receive it at construction and
//! run each operation inside one of its child spans.

use std::io::IsTerminal;
use tracing::{Level, Span};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

/// How chatty the tools are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
  /// Warnings and errors only
  #[default]
  Quiet,
  /// `-v`: informational messages
  Verbose,
  /// `--debug`: everything
  Debug,
}

impl Verbosity {
  /// Pick the verbosity from the `--verbose` / `--debug` flags
  pub fn from_flags(verbose: bool, debug: bool) -> Self {
    if debug {
      Verbosity::Debug
    } else if verbose {
      Verbosity::Verbose
    } else {
      Verbosity::Quiet
    }
  }

  pub fn level(self) -> Level {
    match self {
      Verbosity::Quiet => Level::WARN,
      Verbosity::Verbose => Level::INFO,
      Verbosity::Debug => Level::DEBUG,
    }
  }
}

/// Logging context injected into the builder and uploader
#[derive(Debug, Clone)]
pub struct LogContext {
  root: Span,
}

impl LogContext {
  /// Create a context without installing a subscriber (tests, embedding)
  pub fn new(progname: &'static str, verbosity: Verbosity) -> Self {
    let root = tracing::info_span!("app", progname = progname, verbosity = ?verbosity);
    Self { root }
  }

  /// Span for one operation, nested under the program span
  pub fn span(&self, operation: &'static str) -> Span {
    tracing::info_span!(parent: &self.root, "op", operation = operation)
  }
}

/// Install the stderr subscriber and return the context for `progname`
///
/// `RUST_LOG` takes precedence over the verbosity flags. Installing twice is not an
/// error; the first subscriber stays in place.
pub fn init(progname: &'static str, verbosity: Verbosity) -> LogContext {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::from_level(verbosity.level()).into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
    .with_target(false)
    .try_init();

  let ctx = LogContext::new(progname, verbosity);
  tracing::debug!(progname, ?verbosity, "logging initialized");
  ctx
}
