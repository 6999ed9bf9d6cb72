//! Tool discovery and loading for Orchestra
//!
//! This module handles discovering tool directories, loading and parsing
//! `tool.json` manifests, and validating manifest contents before a tool is
//! constructed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::CliOptions;
use crate::error::{LoadFailure, OrchestraError, Result};

use super::exec::ExecTool;
use super::types::{PluginDescriptor, ToolManifest};
use super::{Tool, ToolLoader};

/// Fixed entry-point filename every tool directory must contain.
pub const ENTRY_POINT: &str = "tool.json";

/// Marker file identifying a shared support package rather than a tool.
pub const PACKAGE_MARKER: &str = ".package";

/// Discover tool entry points under `root`.
///
/// Scans `root/*/` for directories containing [`ENTRY_POINT`]. Plain files,
/// directories without an entry point, and directories carrying
/// [`PACKAGE_MARKER`] are skipped. The result is sorted and deduplicated, so
/// the same filesystem state always yields the same candidates.
///
/// A missing or unreadable root yields no candidates.
pub fn discover_tools(root: &Path) -> Vec<PathBuf> {
    let mut candidates = BTreeSet::new();

    if !root.exists() {
        info!(dir = %root.display(), "Tools directory does not exist, skipping");
        return Vec::new();
    }

    if !root.is_dir() {
        warn!(path = %root.display(), "Tools path is not a directory, skipping");
        return Vec::new();
    }

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %root.display(), error = %e, "Failed to read tools directory");
            return Vec::new();
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Failed to read directory entry, skipping");
                continue;
            }
        };

        let tool_dir = entry.path();
        if !tool_dir.is_dir() {
            continue;
        }

        if tool_dir.join(PACKAGE_MARKER).exists() {
            debug!(dir = %tool_dir.display(), "Skipping package directory");
            continue;
        }

        let entry_point = tool_dir.join(ENTRY_POINT);
        if entry_point.is_file() {
            candidates.insert(entry_point);
        }
    }

    candidates.into_iter().collect()
}

/// Load one tool from its entry point through `loader`.
///
/// Any failure, including one raised by third-party tool code during
/// construction, comes back as a [`LoadFailure`] naming the entry point.
pub fn load_tool(
    entry_point: &Path,
    loader: &dyn ToolLoader,
    options: &CliOptions,
) -> std::result::Result<PluginDescriptor, LoadFailure> {
    match loader.load(entry_point, options) {
        Ok(handle) => Ok(PluginDescriptor::new(entry_point.to_path_buf(), handle)),
        Err(source) => Err(LoadFailure {
            path: entry_point.to_path_buf(),
            source,
        }),
    }
}

/// Read and parse a `tool.json` manifest.
pub fn read_manifest(entry_point: &Path) -> Result<ToolManifest> {
    if !entry_point.exists() {
        return Err(OrchestraError::Manifest(format!(
            "No {} found at {}",
            ENTRY_POINT,
            entry_point.display()
        )));
    }

    let content = fs::read_to_string(entry_point).map_err(|e| {
        OrchestraError::Manifest(format!("Failed to read {}: {}", entry_point.display(), e))
    })?;

    let manifest: ToolManifest = serde_json::from_str(&content)?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

/// Validate a tool manifest.
///
/// - Name must be 1-64 characters of letters, digits, hyphens and
///   underscores, starting with a letter or digit. Menu input is split on
///   whitespace, so a name with spaces could never be selected.
/// - Description must be non-empty.
/// - Exactly one of `binary` and `library` must be set and non-empty.
pub fn validate_manifest(manifest: &ToolManifest) -> Result<()> {
    let name_re = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_\-]{0,63}$")
        .map_err(|e| OrchestraError::Manifest(format!("Invalid name pattern: {}", e)))?;
    if !name_re.is_match(&manifest.name) {
        return Err(OrchestraError::Manifest(format!(
            "Invalid tool name '{}': must be 1-64 alphanumeric characters, hyphens or underscores, starting with alphanumeric",
            manifest.name
        )));
    }

    if manifest.description.trim().is_empty() {
        return Err(OrchestraError::Manifest(format!(
            "Tool '{}' has an empty description",
            manifest.name
        )));
    }

    let has_binary = manifest
        .binary
        .as_deref()
        .is_some_and(|b| !b.trim().is_empty());
    let has_library = manifest
        .library
        .as_deref()
        .is_some_and(|l| !l.trim().is_empty());

    match (has_binary, has_library) {
        (true, false) | (false, true) => Ok(()),
        (false, false) => Err(OrchestraError::Manifest(format!(
            "Tool '{}' must set either 'binary' or 'library'",
            manifest.name
        ))),
        (true, true) => Err(OrchestraError::Manifest(format!(
            "Tool '{}' sets both 'binary' and 'library'",
            manifest.name
        ))),
    }
}

/// Default loader: reads `tool.json` and builds the backend it names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestLoader;

impl ToolLoader for ManifestLoader {
    fn load(&self, entry_point: &Path, options: &CliOptions) -> Result<Box<dyn Tool>> {
        let manifest = read_manifest(entry_point)?;
        let tool_dir = entry_point
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let is_library = manifest
            .library
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty());
        if is_library {
            return load_library_tool(manifest, &tool_dir, options);
        }

        Ok(Box::new(ExecTool::new(manifest, tool_dir, options)))
    }
}

#[cfg(feature = "native-tools")]
fn load_library_tool(
    manifest: ToolManifest,
    tool_dir: &Path,
    options: &CliOptions,
) -> Result<Box<dyn Tool>> {
    let tool = super::native::NativeTool::load(&manifest, tool_dir, options)?;
    Ok(Box::new(tool))
}

#[cfg(not(feature = "native-tools"))]
fn load_library_tool(
    manifest: ToolManifest,
    _tool_dir: &Path,
    _options: &CliOptions,
) -> Result<Box<dyn Tool>> {
    Err(OrchestraError::Tool(format!(
        "Tool '{}' is a shared library; rebuild with the 'native-tools' feature",
        manifest.name
    )))
}
