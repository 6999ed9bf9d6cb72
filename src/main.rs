use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use orchestra::admin::{AdminActions, SystemRunner};
use orchestra::menu::input::RustylineSource;
use orchestra::menu::{render, MenuController};
use orchestra::tools::{ManifestLoader, ToolRegistry};
use orchestra::{cli, interrupt, CliOptions, OrchestraError, Settings};

fn main() -> ExitCode {
    let options = CliOptions::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = interrupt::install_handler() {
        warn!(error = %e, "Continuing without a Ctrl-C handler");
    }

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    let settings = Settings::load(&options.settings)?;
    let registry = ToolRegistry::load_from(&options.tools_dir, &ManifestLoader, options);

    let repo_dir = std::env::current_dir().context("Failed to resolve working directory")?;
    let runner = SystemRunner;
    let admin = AdminActions::new(&settings, &options.settings, &runner, repo_dir);
    let mut stdout = io::stdout();

    if cli::run_requests(options, &registry, &admin, &mut stdout)? {
        return Ok(());
    }

    let mut input = RustylineSource::new()?;
    let mut controller = MenuController::new(&registry, &settings, admin);
    controller.run(&mut input, &mut stdout)?;
    Ok(())
}

fn report(error: &anyhow::Error) {
    match error.downcast_ref::<OrchestraError>() {
        Some(OrchestraError::Interrupted) => {
            println!();
            println!();
            println!("{}", render::warning("^C.   Quitting..."));
        }
        _ => {
            eprintln!("{}", render::warning(&format!("[!] ERROR: {:#}", error)));
        }
    }
}
