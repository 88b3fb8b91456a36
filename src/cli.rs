//! Command-line definitions shared by both binaries

use crate::core::config::{ArchiveFormat, DefOverrides, UploadOverrides};
use crate::core::error::{ExitCode, ReleaseError, print_error};
use crate::release::BuildCommand;
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;

const LICENSE_NOTE: &str = "This is free software with ABSOLUTELY NO WARRANTY.";

/// Build a release descriptor for a Vim plugin
#[derive(Parser, Debug)]
#[command(name = "vimscriptdef", version, long_about = None)]
#[command(styles = get_styles())]
#[command(after_help = LICENSE_NOTE)]
pub struct DefCli {
  /// The working directory
  #[arg(long, value_name = "DIR")]
  pub dir: Option<PathBuf>,

  /// The plugin distribution archive
  #[arg(short = 'a', long, value_name = "FILENAME")]
  pub archive: Option<PathBuf>,

  /// Config file
  #[arg(short = 'c', long, value_name = "YAML")]
  pub config: Option<PathBuf>,

  /// Redistribution format
  #[arg(long, value_enum)]
  pub format: Option<ArchiveFormat>,

  /// The plugin name
  #[arg(short = 'n', long)]
  pub name: Option<String>,

  /// The filename of the YAML output (`-` for stdout)
  #[arg(short = 'o', long = "out", value_name = "FILENAME")]
  pub out: Option<PathBuf>,

  /// Print the plugin's current version number
  #[arg(long, overrides_with = "print_saved_version")]
  pub print_version: bool,

  /// Print the plugin's last saved version number
  #[arg(long, overrides_with = "print_version")]
  pub print_saved_version: bool,

  /// A vimball recipe (implies --archive, --name and --out)
  #[arg(long, value_name = "FILENAME")]
  pub recipe: Option<PathBuf>,

  /// Show debug messages
  #[arg(long)]
  pub debug: bool,

  /// Run verbosely
  #[arg(short = 'v', long)]
  pub verbose: bool,

  /// Source files to scan
  #[arg(value_name = "FILES")]
  pub files: Vec<PathBuf>,
}

impl DefCli {
  pub fn build_command(&self) -> BuildCommand {
    if self.print_version {
      BuildCommand::PrintVersion
    } else if self.print_saved_version {
      BuildCommand::PrintSavedVersion
    } else {
      BuildCommand::Write
    }
  }

  pub fn overrides(&self) -> DefOverrides {
    DefOverrides {
      dir: self.dir.clone(),
      archive: self.archive.clone(),
      format: self.format,
      name: self.name.clone(),
      outfile: self.out.clone(),
      recipe: self.recipe.clone(),
      files: self.files.clone(),
    }
  }
}

/// Upload new plugin versions to www.vim.org
///
/// Descriptor files are YAML with the fields `id` (script ID on www.vim.org),
/// `version`, `message` (the version comment) and `file` (the file to upload).
#[derive(Parser, Debug)]
#[command(name = "vimscriptuploader")]
#[command(disable_version_flag = true)]
#[command(styles = get_styles())]
#[command(after_help = LICENSE_NOTE)]
pub struct UploadCli {
  /// Config file
  #[arg(short = 'c', long, value_name = "YAML")]
  pub config: Option<PathBuf>,

  /// The script ID
  #[arg(long)]
  pub id: Option<String>,

  /// The plugin file
  #[arg(long, value_name = "FILENAME")]
  pub file: Option<String>,

  /// The version comment
  #[arg(long, value_name = "TEXT")]
  pub message: Option<String>,

  /// A file containing the version comment
  #[arg(long, value_name = "FILENAME")]
  pub message_file: Option<PathBuf>,

  /// The script version
  #[arg(long = "version", value_name = "TEXT")]
  pub script_version: Option<String>,

  /// User password
  #[arg(long, value_name = "TEXT")]
  pub password: Option<String>,

  /// User name
  #[arg(long, value_name = "TEXT")]
  pub username: Option<String>,

  /// Base URL of the site
  #[arg(long, value_name = "URL")]
  pub site: Option<String>,

  /// Don't actually upload anything; just print what would be sent
  #[arg(short = 'n', long = "dry-run", overrides_with = "no_dry_run")]
  pub dry_run: bool,

  /// Upload even if the config file asks for a dry run
  #[arg(long = "no-dry-run", overrides_with = "dry_run")]
  pub no_dry_run: bool,

  /// Show debug messages
  #[arg(long)]
  pub debug: bool,

  /// Run verbosely
  #[arg(short = 'v', long)]
  pub verbose: bool,

  /// Release descriptor files (PLUGIN.yml ...)
  #[arg(value_name = "PLUGIN.yml")]
  pub descriptors: Vec<PathBuf>,
}

impl UploadCli {
  pub fn overrides(&self) -> UploadOverrides {
    let dry = if self.dry_run {
      Some(true)
    } else if self.no_dry_run {
      Some(false)
    } else {
      None
    };
    UploadOverrides {
      id: self.id.clone(),
      file: self.file.clone(),
      message: self.message.clone(),
      message_file: self.message_file.clone(),
      version: self.script_version.clone(),
      username: self.username.clone(),
      password: self.password.clone(),
      site: self.site.clone(),
      dry,
    }
  }
}

/// Parse the command line; help exits 1, malformed arguments exit 5
pub fn parse_or_exit<T: Parser>() -> T {
  match T::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      let code = match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitCode::Failure.as_i32(),
        ErrorKind::DisplayVersion => 0,
        _ => ExitCode::Config.as_i32(),
      };
      let _ = err.print();
      std::process::exit(code);
    }
  }
}

/// Report a fatal error and exit with its code
pub fn exit_with(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}

pub fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}
