//! vimscriptuploader: publish new plugin versions to www.vim.org

use vimscript_release::cli::{UploadCli, exit_with, parse_or_exit};
use vimscript_release::core::config::UploadConfig;
use vimscript_release::core::error::{ConfigError, ReleaseResult};
use vimscript_release::core::logging::{self, LogContext, Verbosity};
use vimscript_release::upload::{Uploader, VimOrgClient};

fn main() {
  let cli: UploadCli = parse_or_exit();
  let log = logging::init("vimscriptuploader", Verbosity::from_flags(cli.verbose, cli.debug));

  if let Err(err) = run(&cli, log) {
    exit_with(err);
  }
}

fn run(cli: &UploadCli, log: LogContext) -> ReleaseResult<()> {
  if cli.descriptors.is_empty() {
    return Err(ConfigError::NoDescriptors.into());
  }

  let config = UploadConfig::load(cli.config.as_deref())?.apply_cli(cli.overrides())?;
  tracing::debug!("Site: {}, dry run: {}", config.site, config.dry);

  let client = VimOrgClient::new(&config.site)?;
  let mut uploader = Uploader::new(config, client, log);
  let mut stdout = std::io::stdout().lock();
  uploader.process(&cli.descriptors, &mut stdout)?;
  Ok(())
}
