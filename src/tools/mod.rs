//! Tool plugin system for Orchestra
//!
//! Tools are discovered from a two-level directory layout. Each tool lives in
//! its own directory containing a `tool.json` manifest. The manifest either
//! points at an executable (the default backend) or, with the
//! `native-tools` feature, at a shared library exporting a constructor.
//!
//! # Architecture
//!
//! - **types**: Core data structures (`ToolManifest`, `PluginDescriptor`)
//! - **loader**: Candidate discovery, manifest loading and validation
//! - **registry**: Sorted, case-insensitive lookup over loaded tools
//! - **exec**: Executable-backed tools
//! - **native**: Shared-library tools (feature `native-tools`)
//!
//! # Tool Directory Structure
//!
//! ```text
//! tools/
//! ├── evasion/
//! │   ├── tool.json
//! │   └── evasion.sh
//! ├── ordnance/
//! │   ├── tool.json
//! │   └── libordnance.so
//! └── common/
//!     ├── .package
//!     └── tool.json        (ignored: marked as a shared package)
//! ```
//!
//! # Example tool.json
//!
//! ```json
//! {
//!   "name": "Evasion",
//!   "version": "3.1.0",
//!   "description": "Generates payloads that avoid common detection",
//!   "binary": "evasion.sh",
//!   "menu_args": ["--menu"],
//!   "cli_args": ["--batch"],
//!   "env": { "LANG": "C" }
//! }
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use orchestra::config::CliOptions;
//! use orchestra::tools::{ManifestLoader, ToolRegistry};
//!
//! let options = CliOptions::default();
//! let registry = ToolRegistry::load_from(Path::new("tools"), &ManifestLoader, &options);
//!
//! for (index, tool) in registry.all().iter().enumerate() {
//!     println!("{}) {}", index + 1, tool.cli_name());
//! }
//! ```

pub mod exec;
mod loader;
#[cfg(feature = "native-tools")]
pub mod native;
pub mod registry;
pub mod types;

use std::path::Path;

use crate::config::CliOptions;
use crate::error::Result;

pub use exec::ExecTool;
pub use loader::{
    discover_tools, load_tool, validate_manifest, ManifestLoader, ENTRY_POINT, PACKAGE_MARKER,
};
pub use registry::ToolRegistry;
pub use types::{PluginDescriptor, ToolManifest};

/// The contract every tool satisfies, whatever backend constructed it.
pub trait Tool {
    /// Name shown in the menu and used for case-insensitive selection.
    fn cli_name(&self) -> &str;

    /// One-line description shown by `info`.
    fn description(&self) -> &str;

    /// Run the tool's own interactive menu. Blocks until the user leaves it.
    fn interactive_menu(&self) -> Result<()>;

    /// Non-interactive invocation, used for `--tool <name>`.
    fn run_direct(&self) -> Result<()>;
}

/// Constructs a tool from its entry point.
///
/// The parsed command line is the only construction argument, so tools can
/// pick up forwarded arguments.
pub trait ToolLoader {
    fn load(&self, entry_point: &Path, options: &CliOptions) -> Result<Box<dyn Tool>>;
}
