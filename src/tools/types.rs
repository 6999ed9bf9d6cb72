//! Tool types for Orchestra
//!
//! This module defines the manifest structure parsed from `tool.json` files
//! and the runtime descriptor the registry stores for each loaded tool.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::Tool;

/// The manifest loaded from a tool's `tool.json` file.
///
/// Exactly one of `binary` and `library` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolManifest {
    /// Menu name. Alphanumeric, hyphens and underscores, 1-64 characters.
    pub name: String,

    /// Human-readable description of what the tool does.
    pub description: String,

    /// Optional version string.
    #[serde(default)]
    pub version: Option<String>,

    /// Optional author name or identifier.
    #[serde(default)]
    pub author: Option<String>,

    /// Executable implementing the tool, relative to the tool directory or
    /// a program name on `PATH`.
    #[serde(default)]
    pub binary: Option<String>,

    /// Shared library implementing the tool, relative to the tool directory.
    #[serde(default)]
    pub library: Option<String>,

    /// Arguments passed when opening the tool's interactive menu.
    #[serde(default)]
    pub menu_args: Vec<String>,

    /// Arguments passed on direct invocation, before forwarded arguments.
    #[serde(default)]
    pub cli_args: Vec<String>,

    /// Environment variables set for the tool process.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// One loaded tool as held by the registry.
pub struct PluginDescriptor {
    source_path: PathBuf,
    cli_name: String,
    description: String,
    handle: Box<dyn Tool>,
}

impl PluginDescriptor {
    /// Wrap a constructed tool, capturing its name and description.
    pub fn new(source_path: PathBuf, handle: Box<dyn Tool>) -> Self {
        Self {
            source_path,
            cli_name: handle.cli_name().to_string(),
            description: handle.description().to_string(),
            handle,
        }
    }

    /// Entry point the tool was loaded from. Unique per registry.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Name the tool reported at construction, used for display and lookup.
    pub fn cli_name(&self) -> &str {
        &self.cli_name
    }

    /// One-line description the tool reported at construction.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The callable tool.
    pub fn handle(&self) -> &dyn Tool {
        self.handle.as_ref()
    }

    /// Case-insensitive name comparison.
    pub fn matches_name(&self, name: &str) -> bool {
        self.cli_name.to_lowercase() == name.to_lowercase()
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("source_path", &self.source_path)
            .field("cli_name", &self.cli_name)
            .field("description", &self.description)
            .finish()
    }
}
