//! vimscriptdef: build the release descriptor for a Vim plugin

use vimscript_release::cli::{DefCli, exit_with, parse_or_exit};
use vimscript_release::core::config::DefConfig;
use vimscript_release::core::error::ReleaseResult;
use vimscript_release::core::logging::{self, LogContext, Verbosity};
use vimscript_release::release::DescriptorBuilder;

fn main() {
  let cli: DefCli = parse_or_exit();
  let log = logging::init("vimscriptdef", Verbosity::from_flags(cli.verbose, cli.debug));
  tracing::debug!("Arguments: {:?}", cli);

  if let Err(err) = run(&cli, log) {
    exit_with(err);
  }
}

fn run(cli: &DefCli, log: LogContext) -> ReleaseResult<()> {
  let config = DefConfig::load(cli.config.as_deref())?.apply_cli(cli.overrides())?;
  tracing::debug!("Configuration: {:?}", config);

  let builder = DescriptorBuilder::new(config, log)?;
  builder.run(cli.build_command(), std::io::stdout().lock())
}
