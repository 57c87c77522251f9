mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::commands::Ctx;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
            _ => std::process::exit(report(usage_error(&err), 0)),
        },
    };

    init_tracing(cli.global.verbose);

    let verbose = cli.global.verbose;
    if let Err(err) = run(cli).await {
        std::process::exit(report(err, verbose));
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Collapse a clap parse error to its first line.
fn usage_error(err: &clap::Error) -> CliError {
    let text = err.to_string();
    let message = text
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_owned();
    CliError::Usage { message }
}

/// Print the error to stderr and return its exit code. One line by
/// default; the full diagnostic with help text under `-v`.
fn report(err: CliError, verbose: u8) -> i32 {
    let code = err.exit_code();
    if verbose > 0 {
        eprintln!("{:?}", miette::Report::new(err));
    } else {
        eprintln!("error[{}]: {err}", err.kind());
    }
    code
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions need no configuration or connection
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "ontap-san", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load()?;
            let ctx = Ctx {
                format: config::output_format(&cli.global, &cfg),
                color: output::should_color(cli.global.color),
                quiet: cli.global.quiet,
                yes: cli.global.yes,
            };
            let client = config::build_client(&cli.global, &cfg)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &client, &ctx).await
        }
    }
}
