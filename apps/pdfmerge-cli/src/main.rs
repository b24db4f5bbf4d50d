//! pdfmerge binary
//!
//! Logs go to stderr so stdout stays clean for listings and JSON.

use std::io;

use clap::Parser;
use pdfmerge_cli::cli::{Args, Command};
use pdfmerge_cli::commands::{run_info, run_merge};
use pdfmerge_cli::shell::{Shell, ShellCommand};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = args.load_config()?;
    let executor = config.executor();
    let mut stdout = io::stdout().lock();

    match &args.command {
        Command::Merge {
            files,
            output_name,
            order,
        } => {
            let path = run_merge(
                &config,
                &executor,
                files,
                output_name.as_deref(),
                order.as_deref(),
                &mut stdout,
            )?;
            info!("Wrote {}", path.display());
        }
        Command::Info { files, json } => run_info(files, *json, &mut stdout)?,
        Command::Shell { files } => {
            let mut shell = Shell::new(config, &executor);
            if !files.is_empty() {
                shell.execute(ShellCommand::Add(files.clone()), &mut stdout)?;
            }
            shell.run(io::stdin().lock(), &mut stdout)?;
        }
    }

    Ok(())
}
