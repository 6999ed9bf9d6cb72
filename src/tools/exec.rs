//! Executable-backed tools.
//!
//! An [`ExecTool`] wraps the program named by a manifest's `binary` field.
//! Both the interactive menu and direct invocation run it as a child process
//! that inherits the terminal, with the tool directory as working directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::CliOptions;
use crate::error::{OrchestraError, Result};
use crate::interrupt;

use super::types::ToolManifest;
use super::Tool;

/// A tool implemented by an external program.
#[derive(Debug, Clone)]
pub struct ExecTool {
    manifest: ToolManifest,
    tool_dir: PathBuf,
    forwarded_args: Vec<String>,
}

impl ExecTool {
    /// Build from a validated manifest. Forwarded arguments are taken from
    /// the outer command line and appended on direct invocation.
    pub fn new(manifest: ToolManifest, tool_dir: PathBuf, options: &CliOptions) -> Self {
        Self {
            manifest,
            tool_dir,
            forwarded_args: options.tool_args.clone(),
        }
    }

    pub fn manifest(&self) -> &ToolManifest {
        &self.manifest
    }

    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    /// Program to execute: a file inside the tool directory if one exists,
    /// otherwise the bare name for `PATH` lookup.
    pub fn program(&self) -> PathBuf {
        let binary = self.manifest.binary.as_deref().unwrap_or_default();
        let local = self.tool_dir.join(binary);
        if local.is_file() {
            // The child runs with `tool_dir` as cwd, so a relative path would be ambiguous.
            if local.is_relative() {
                std::env::current_dir()
                    .map(|cwd| cwd.join(&local))
                    .unwrap_or(local)
            } else {
                local
            }
        } else {
            PathBuf::from(binary)
        }
    }

    fn run(&self, args: &[String]) -> Result<()> {
        let program = self.program();
        debug!(
            tool = %self.manifest.name,
            program = %program.display(),
            args = ?args,
            "Running tool"
        );

        let status = Command::new(&program)
            .args(args)
            .current_dir(&self.tool_dir)
            .envs(&self.manifest.env)
            .status()
            .map_err(|e| {
                OrchestraError::Tool(format!(
                    "Failed to run {} for tool '{}': {}",
                    program.display(),
                    self.manifest.name,
                    e
                ))
            })?;

        if interrupt::child_interrupted(&status) {
            return Err(OrchestraError::Interrupted);
        }

        if status.success() {
            Ok(())
        } else {
            Err(OrchestraError::ToolFailed {
                name: self.manifest.name.clone(),
                code: status.code(),
            })
        }
    }
}

impl Tool for ExecTool {
    fn cli_name(&self) -> &str {
        &self.manifest.name
    }

    fn description(&self) -> &str {
        &self.manifest.description
    }

    fn interactive_menu(&self) -> Result<()> {
        self.run(&self.manifest.menu_args)
    }

    fn run_direct(&self) -> Result<()> {
        let mut args = self.manifest.cli_args.clone();
        args.extend(self.forwarded_args.iter().cloned());
        self.run(&args)
    }
}
