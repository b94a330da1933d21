//! keycalc CLI library
//!
//! Command-line front end for the keycalc engine: one-shot evaluation of
//! key strings, a line-based REPL, a raw-mode terminal calculator and a
//! host bridge check.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
pub mod session;

pub use commands::{
    BridgeArgs, Cli, ColorArg, Commands, EvalArgs, EvalFormat, KeysArgs, ReplArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{describe, Printer};

/// Builds the effective configuration: defaults, then the config file, then
/// the command-line flags
pub fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::new(),
    };
    if cli.quiet || cli.verbose > 0 {
        config.verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    }
    if let Some(color) = cli.color {
        config.color = color.into();
    }
    Ok(config)
}

/// Runs a parsed command line
pub fn execute(cli: Cli) -> CliResult<()> {
    let config = build_config(&cli)?;
    logging::init(&config)?;
    tracing::debug!(?config, "configuration loaded");

    let stdout = std::io::stdout();
    match cli.command {
        Commands::Eval(args) => session::eval(&config, &args, &mut stdout.lock()),
        Commands::Repl(args) => session::repl(
            &config,
            &args,
            std::io::stdin().lock(),
            &mut stdout.lock(),
            &mut std::io::stderr().lock(),
        ),
        Commands::Run => session::run(&config),
        Commands::Keys(args) => session::keys(&config, &args, &mut stdout.lock()),
        Commands::Bridge(args) => session::bridge(&config, &args, &mut stdout.lock()),
    }
}
