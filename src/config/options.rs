//! Outer command line.
//!
//! The parsed [`CliOptions`] is handed to every tool constructor so tools can
//! read their own trailing arguments on direct invocation.

use std::path::PathBuf;

use clap::Parser;

use super::{SETTINGS_ENV, SETTINGS_PATH};

/// Default tools root, relative to the working directory.
pub const DEFAULT_TOOLS_DIR: &str = "tools";

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "orchestra")]
#[command(version, about = "Menu shell for discovering and running plugin tools", long_about = None)]
pub struct CliOptions {
    /// Run the named tool directly instead of opening the menu
    #[arg(short, long, value_name = "NAME")]
    pub tool: Option<String>,

    /// Print the available tools and exit
    #[arg(long)]
    pub list_tools: bool,

    /// Update the framework and exit
    #[arg(long)]
    pub update: bool,

    /// Run the setup script and exit
    #[arg(long)]
    pub setup: bool,

    /// Regenerate the settings file and exit
    #[arg(long)]
    pub config: bool,

    /// Directory scanned for `<tool>/tool.json`
    #[arg(long, value_name = "DIR", default_value = DEFAULT_TOOLS_DIR)]
    pub tools_dir: PathBuf,

    /// Settings file
    #[arg(long, value_name = "PATH", env = SETTINGS_ENV, default_value = SETTINGS_PATH)]
    pub settings: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Arguments forwarded to the tool selected with --tool
    #[arg(last = true, value_name = "TOOL_ARGS")]
    pub tool_args: Vec<String>,
}

impl CliOptions {
    /// Log filter directive matching the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Whether a non-interactive admin action was requested.
    pub fn wants_admin_action(&self) -> bool {
        self.update || self.setup || self.config
    }
}
