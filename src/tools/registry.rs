//! Tool registry for Orchestra
//!
//! This module provides the `ToolRegistry` struct holding every tool loaded
//! at startup. Tools are keyed by their entry-point path and presented in a
//! case-insensitive name order that also defines the 1-based menu indices.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::CliOptions;
use crate::error::{LoadFailure, OrchestraError};

use super::loader::{discover_tools, load_tool};
use super::types::PluginDescriptor;
use super::ToolLoader;

/// A registry of loaded tools.
///
/// The registry is populated once and read-only afterwards. It maintains:
/// - Entry-point path to descriptor
/// - The display order (sorted by name, case-insensitively)
///
/// Names are unique case-insensitively; a second tool with a colliding name
/// is rejected at registration.
///
/// # Example
///
/// ```rust
/// use std::path::PathBuf;
/// use orchestra::error::Result;
/// use orchestra::tools::{PluginDescriptor, Tool, ToolRegistry};
///
/// struct Hello;
///
/// impl Tool for Hello {
///     fn cli_name(&self) -> &str { "Hello" }
///     fn description(&self) -> &str { "Says hello" }
///     fn interactive_menu(&self) -> Result<()> { Ok(()) }
///     fn run_direct(&self) -> Result<()> { Ok(()) }
/// }
///
/// let registry = ToolRegistry::from_descriptors(vec![PluginDescriptor::new(
///     PathBuf::from("tools/hello/tool.json"),
///     Box::new(Hello),
/// )]);
///
/// assert_eq!(registry.count(), 1);
/// assert!(registry.find_by_name("HELLO").is_some());
/// assert_eq!(registry.find_by_index(1).unwrap().cli_name(), "Hello");
/// ```
#[derive(Debug, Default)]
pub struct ToolRegistry {
    /// Map from entry-point path to descriptor.
    tools: BTreeMap<PathBuf, PluginDescriptor>,

    /// Entry-point paths in display order.
    order: Vec<PathBuf>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover every tool under `root` and load it with `loader`.
    ///
    /// Tools that fail to load are logged and skipped; they never abort
    /// startup.
    pub fn load_from(root: &Path, loader: &dyn ToolLoader, options: &CliOptions) -> Self {
        let mut registry = Self::new();

        for entry_point in discover_tools(root) {
            let result = load_tool(&entry_point, loader, options)
                .and_then(|descriptor| registry.register(descriptor));
            if let Err(failure) = result {
                warn!(
                    path = %failure.path.display(),
                    error = %failure.source,
                    "Failed to load tool, skipping"
                );
            }
        }

        info!(
            root = %root.display(),
            tools = registry.count(),
            "Tool discovery complete"
        );
        registry
    }

    /// Build a registry from already constructed descriptors.
    ///
    /// Descriptors that collide with an earlier one are dropped with a
    /// warning, just as during discovery.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = PluginDescriptor>) -> Self {
        let mut registry = Self::new();
        for descriptor in descriptors {
            if let Err(failure) = registry.register(descriptor) {
                warn!(
                    path = %failure.path.display(),
                    error = %failure.source,
                    "Rejected tool"
                );
            }
        }
        registry
    }

    /// Register a descriptor and refresh the display order.
    fn register(&mut self, descriptor: PluginDescriptor) -> Result<(), LoadFailure> {
        let path = descriptor.source_path().to_path_buf();

        if self.tools.contains_key(&path) {
            return Err(LoadFailure {
                path,
                source: OrchestraError::Tool("entry point already registered".into()),
            });
        }

        if let Some(existing) = self.find_by_name(descriptor.cli_name()) {
            return Err(LoadFailure {
                source: OrchestraError::Tool(format!(
                    "Tool name '{}' conflicts with '{}' from {}",
                    descriptor.cli_name(),
                    existing.cli_name(),
                    existing.source_path().display()
                )),
                path,
            });
        }

        info!(
            tool = %descriptor.cli_name(),
            path = %path.display(),
            "Registered tool"
        );

        self.tools.insert(path, descriptor);
        self.rebuild_order();
        Ok(())
    }

    fn rebuild_order(&mut self) {
        let mut order: Vec<&PluginDescriptor> = self.tools.values().collect();
        order.sort_by(|a, b| {
            a.cli_name()
                .to_lowercase()
                .cmp(&b.cli_name().to_lowercase())
                .then_with(|| a.cli_name().cmp(b.cli_name()))
                .then_with(|| a.source_path().cmp(b.source_path()))
        });
        self.order = order
            .into_iter()
            .map(|d| d.source_path().to_path_buf())
            .collect();
    }

    /// All tools sorted by name, case-insensitively.
    pub fn all(&self) -> Vec<&PluginDescriptor> {
        self.order
            .iter()
            .filter_map(|path| self.tools.get(path))
            .collect()
    }

    /// Look up a tool by name, case-insensitively.
    pub fn find_by_name(&self, name: &str) -> Option<&PluginDescriptor> {
        self.tools.values().find(|d| d.matches_name(name))
    }

    /// Look up a tool by 1-based position in [`Self::all`].
    pub fn find_by_index(&self, index: usize) -> Option<&PluginDescriptor> {
        if index == 0 {
            return None;
        }
        self.order
            .get(index - 1)
            .and_then(|path| self.tools.get(path))
    }

    /// Resolve a menu selector: an all-digit selector within range picks by
    /// index, anything else (including an out-of-range number) by name.
    pub fn resolve(&self, selector: &str) -> Option<&PluginDescriptor> {
        let is_number = !selector.is_empty() && selector.chars().all(|c| c.is_ascii_digit());
        if is_number {
            let by_index = selector
                .parse::<usize>()
                .ok()
                .and_then(|i| self.find_by_index(i));
            if by_index.is_some() {
                return by_index;
            }
        }
        self.find_by_name(selector)
    }

    /// Look up a tool by its entry-point path.
    pub fn get(&self, path: &Path) -> Option<&PluginDescriptor> {
        self.tools.get(path)
    }

    /// Tool names in display order.
    pub fn names(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .map(|d| d.cli_name().to_string())
            .collect()
    }

    /// Number of loaded tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tool loaded.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
