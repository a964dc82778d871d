//! Menu-driven front-end for kops, kubectl and the AWS CLI.
//!
//! Keeps one cluster definition in memory, reconciled on startup against the
//! kops state bucket, and drives the external tools from a numbered menu.

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use kops_console::core::menu::DispatchTable;
use kops_console::io::aws::AwsCli;
use kops_console::io::config::{DEFAULT_CONFIG_PATH, load_config};
use kops_console::io::console::TerminalConsole;
use kops_console::io::desktop::SystemDesktop;
use kops_console::io::kops::Kops;
use kops_console::io::kubectl::Kubectl;
use kops_console::io::process::Tool;
use kops_console::logging;
use kops_console::reconciler::{Reconciler, ReconcilerSettings};
use kops_console::session::Session;

#[derive(Parser)]
#[command(
    name = "kops-console",
    version,
    about = "Numbered menu for defining and running a kops cluster"
)]
struct Cli {
    /// Path to the TOML config file (defaults apply when it is missing).
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Start the interactive menu (default).
    Run,
    /// Print the menu and exit.
    Menu,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => cmd_run(&cli.config),
        Command::Menu => cmd_menu(),
    }
}

fn cmd_menu() -> Result<()> {
    for line in DispatchTable::standard().render() {
        println!("{line}");
    }
    Ok(())
}

fn cmd_run(config_path: &std::path::Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let tools = &cfg.tools;
    let desktop = SystemDesktop::new(
        Tool::from_argv(&tools.clipboard).context("tools.clipboard")?,
        Tool::from_argv(&tools.browser).context("tools.browser")?,
    );
    let reconciler = Reconciler::new(
        Kops::new(Tool::new(&tools.kops)),
        AwsCli::new(Tool::new(&tools.aws)),
        ReconcilerSettings::from(&cfg),
    );
    let mut session = Session::new(
        reconciler,
        Kubectl::new(Tool::new(&tools.kubectl)),
        desktop,
        cfg.dashboard.clone(),
    );
    let mut console = TerminalConsole::new(BufReader::new(io::stdin()), io::stdout());
    session.run(&mut console)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::parse_from(["kops-console"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn parse_menu_with_config() {
        let cli = Cli::parse_from(["kops-console", "--config", "lab.toml", "menu"]);
        assert_eq!(cli.command, Some(Command::Menu));
        assert_eq!(cli.config, PathBuf::from("lab.toml"));
    }
}
