mod config;
mod params;
mod post;
mod runner;
mod runtime;
mod sweep;

use crate::config::Config;
use crate::post::PostProcessor;
use crate::sweep::Controller;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Path to the experiment definition file.
    #[arg(long)]
    exp_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every configuration of the experiment.
    Run,

    /// Print the launcher invocations without executing them.
    Check,

    /// Plot the current contents of the data directory.
    Plot,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.exp_file).context("failed to construct cfg")?;
    log::info!("{cfg:#?}");

    match args.command {
        Command::Run => {
            Controller::new(cfg).run()?;
        }
        Command::Check => check(cfg),
        Command::Plot => PostProcessor::new(&cfg).plot(),
    }

    Ok(())
}

fn check(cfg: Config) {
    let launcher = cfg.tools.launcher.clone();
    let simulator = cfg.tools.simulator.clone();

    for (label, par) in Controller::new(cfg).configs() {
        log::info!(
            "configuration {label}: {launcher} -np {} {} {}",
            par.n_procs,
            simulator.display(),
            par.simulator_args().join(" ")
        );
    }
}
