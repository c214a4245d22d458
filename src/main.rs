// src/main.rs

use anyhow::Result;
use bpm::{InstallOptions, InstallSelection, Layout, ListSelection, RemoveOptions, RemoveSelection};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

/// Filter directive for a verbosity level (number of -v minus number of -q)
fn level_directive(verbosity: i32) -> &'static str {
    match verbosity {
        i32::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbosity: i32) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let layout = Layout::new(&cli.root);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Install {
            dry_run,
            no_deps,
            keep,
            all,
            installed,
            partial,
            modules,
        } => {
            let options = InstallOptions {
                dry_run,
                follow_dependencies: !no_deps,
                keep_partial: keep,
            };
            let selection = if all {
                InstallSelection::All
            } else if installed {
                InstallSelection::Installed
            } else if partial {
                InstallSelection::Partial
            } else {
                InstallSelection::Modules(modules)
            };
            commands::cmd_install(&layout, config, options, selection)
        }

        Commands::Remove {
            dry_run,
            force,
            dependents,
            all,
            partial,
            packages,
        } => {
            let options = RemoveOptions {
                dry_run,
                force,
                cascade: dependents,
            };
            let selection = if all {
                RemoveSelection::All
            } else if partial {
                RemoveSelection::Partial
            } else {
                RemoveSelection::Packages(packages)
            };
            commands::cmd_remove(&layout, config, options, selection)
        }

        Commands::List {
            all,
            installed,
            partial,
            buildable,
            prefix,
        } => {
            let selection = if all {
                ListSelection::All
            } else if installed || (buildable && !partial) {
                ListSelection::Installed
            } else if partial {
                ListSelection::Partial
            } else {
                ListSelection::All
            };
            commands::cmd_list(&layout, config, selection, buildable, prefix.as_deref().unwrap_or(""))
        }

        Commands::Headers => commands::cmd_headers(&layout),

        Commands::Index => commands::cmd_index(&layout),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bpm: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
