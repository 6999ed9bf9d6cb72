//! Administrative actions: show options, update, setup and config.
//!
//! Every external program goes through a [`CommandRunner`], and every failure
//! is fatal: the action returns an error and the shell exits with status 1.

mod runner;

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{OrchestraError, Result};

pub use runner::{CommandRunner, SystemRunner};

#[cfg(test)]
pub use runner::MockCommandRunner;

/// Setup script name under `config/`.
pub const SETUP_SCRIPT: &str = "setup.sh";

/// Settings generator script name under `config/`.
pub const CONFIG_SCRIPT: &str = "update-config.sh";

/// Arguments passed to the setup script.
pub const SETUP_ARGS: &[&str] = &["-f", "-s"];

/// The built-in, non-plugin operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    ShowOptions,
    Update,
    Setup,
    Config,
}

impl AdminAction {
    /// Prompt shown after the action finishes in the interactive menu.
    pub fn pause_message(self) -> &'static str {
        match self {
            AdminAction::ShowOptions => "Options shown. Press enter to continue",
            AdminAction::Update => "Orchestra has checked for updates, press enter to continue",
            AdminAction::Setup => "Setup finished, press enter to continue",
            AdminAction::Config => "Configuration updated, press enter to continue",
        }
    }
}

/// Runs administrative actions against the loaded settings.
pub struct AdminActions<'a> {
    settings: &'a Settings,
    settings_path: PathBuf,
    runner: &'a dyn CommandRunner,
    repo_dir: PathBuf,
}

impl<'a> AdminActions<'a> {
    /// `settings_path` is only displayed; `repo_dir` anchors the
    /// repository-relative `config/` scripts on non-packaged systems.
    pub fn new(
        settings: &'a Settings,
        settings_path: impl Into<PathBuf>,
        runner: &'a dyn CommandRunner,
        repo_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            settings_path: settings_path.into(),
            runner,
            repo_dir: repo_dir.into(),
        }
    }

    /// Run one action to completion. Any failure is fatal to the caller.
    pub fn perform(&self, action: AdminAction, out: &mut dyn Write) -> Result<()> {
        match action {
            AdminAction::ShowOptions => self.show_options(out),
            AdminAction::Update => self.update(out),
            AdminAction::Setup => self.setup(out),
            AdminAction::Config => self.config(out),
        }
    }

    /// Print the settings file location and every non-internal setting.
    pub fn show_options(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(
            out,
            " [i] Orchestra configuration file: {}",
            self.settings_path.display()
        )?;
        for (name, value) in self.settings.options() {
            writeln!(out, " [i] {}: {}", name, value)?;
        }
        Ok(())
    }

    /// Package-manager update on the packaged OS, `git pull` elsewhere.
    pub fn update(&self, out: &mut dyn Write) -> Result<()> {
        if self.settings.is_packaged() {
            writeln!(out, " [*] Updating {} through apt-get", self.settings.package_name)?;
            self.run_command("apt-get", &["update"])?;
            self.run_command("apt-get", &["-y", "install", &self.settings.package_name])?;
        } else {
            writeln!(out, " [*] Updating from git")?;
            self.run_command("git", &["pull"])?;
        }
        Ok(())
    }

    /// Run `config/setup.sh -f -s`.
    pub fn setup(&self, out: &mut dyn Write) -> Result<()> {
        let script = self.script_path(SETUP_SCRIPT);
        writeln!(out, " [*] Running {}", script.display())?;
        self.run_script(&script, SETUP_ARGS, SETUP_SCRIPT)
    }

    /// Run `config/update-config.sh` to regenerate the settings file.
    pub fn config(&self, out: &mut dyn Write) -> Result<()> {
        let script = self.script_path(CONFIG_SCRIPT);
        writeln!(out, " [*] Running {}", script.display())?;
        self.run_script(&script, &[], CONFIG_SCRIPT)
    }

    /// Installed copy on the packaged OS, repository copy otherwise.
    pub fn script_path(&self, name: &str) -> PathBuf {
        let base = if self.settings.is_packaged() {
            &self.settings.install_path
        } else {
            &self.repo_dir
        };
        base.join("config").join(name)
    }

    fn run_command(&self, program: &str, args: &[&str]) -> Result<()> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let command = std::iter::once(program.to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        debug!(command = %command, "Running external command");

        let code = self.runner.run(program, &args)?;
        if code != Some(0) {
            return Err(OrchestraError::ExternalCommand { command, code });
        }
        info!(command = %command, "External command succeeded");
        Ok(())
    }

    fn run_script(&self, script: &Path, args: &[&str], name: &str) -> Result<()> {
        if !script.exists() {
            return Err(OrchestraError::ScriptMissing(script.to_path_buf()));
        }

        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        debug!(script = %script.display(), args = ?args, "Running script");

        let code = self.runner.run(&script.to_string_lossy(), &args)?;
        if code != Some(0) {
            return Err(OrchestraError::ScriptFailed {
                script: name.to_string(),
                code,
            });
        }
        Ok(())
    }
}
