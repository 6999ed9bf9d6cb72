//! Shared-library tools (feature `native-tools`).
//!
//! A manifest with a `library` field names a `.so`/`.dylib`/`.dll` inside the
//! tool directory. The library must export [`TOOL_ENTRY_SYMBOL`] with the
//! [`ToolEntryFn`] signature and be built against the same `orchestra`
//! version and compiler as the host.
//!
//! ```rust,ignore
//! #[no_mangle]
//! pub fn orchestra_tool_entry(options: &CliOptions) -> Box<dyn Tool> {
//!     Box::new(Ordnance::new(options))
//! }
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use libloading::Library;
use tracing::info;

use crate::config::CliOptions;
use crate::error::{OrchestraError, Result};

use super::types::ToolManifest;
use super::Tool;

/// Constructor exported by a native tool library.
pub type ToolEntryFn = unsafe fn(&CliOptions) -> Box<dyn Tool>;

/// Name of the constructor symbol.
pub const TOOL_ENTRY_SYMBOL: &str = "orchestra_tool_entry";

/// A tool constructed from a shared library.
pub struct NativeTool {
    // Declared before `_library` so the tool drops while its code is mapped.
    inner: Box<dyn Tool>,
    _library: Library,
}

impl NativeTool {
    /// Load the manifest's library from `tool_dir` and construct the tool.
    pub fn load(manifest: &ToolManifest, tool_dir: &Path, options: &CliOptions) -> Result<Self> {
        let library_name = manifest.library.as_deref().ok_or_else(|| {
            OrchestraError::Manifest(format!("Tool '{}' has no library", manifest.name))
        })?;
        let path = tool_dir.join(library_name);
        if !path.is_file() {
            return Err(OrchestraError::NotFound(format!(
                "library {} for tool '{}'",
                path.display(),
                manifest.name
            )));
        }

        // SAFETY: loading a tool library runs its initialisers and trusts the
        // exported symbol to match `ToolEntryFn`. Tools are the extension
        // mechanism, not a security boundary.
        let (library, inner) = unsafe {
            let library = Library::new(&path).map_err(|e| {
                OrchestraError::Tool(format!("Failed to load library {}: {}", path.display(), e))
            })?;

            let inner = {
                let entry_fn: libloading::Symbol<ToolEntryFn> =
                    library.get(TOOL_ENTRY_SYMBOL.as_bytes()).map_err(|e| {
                        OrchestraError::Tool(format!(
                            "Missing entry point '{}' in {}: {}",
                            TOOL_ENTRY_SYMBOL,
                            path.display(),
                            e
                        ))
                    })?;
                construct(&path, || entry_fn(options))?
            };
            (library, inner)
        };

        info!(tool = %inner.cli_name(), library = %path.display(), "Loaded native tool");

        Ok(Self {
            inner,
            _library: library,
        })
    }
}

/// Run a tool constructor, turning a panic into a load error.
fn construct(path: &Path, entry: impl FnOnce() -> Box<dyn Tool>) -> Result<Box<dyn Tool>> {
    panic::catch_unwind(AssertUnwindSafe(entry)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        OrchestraError::Tool(format!(
            "Tool constructor in {} panicked: {}",
            path.display(),
            reason
        ))
    })
}

impl fmt::Debug for NativeTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeTool")
            .field("name", &self.inner.cli_name())
            .finish()
    }
}

impl Tool for NativeTool {
    fn cli_name(&self) -> &str {
        self.inner.cli_name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn interactive_menu(&self) -> Result<()> {
        self.inner.interactive_menu()
    }

    fn run_direct(&self) -> Result<()> {
        self.inner.run_direct()
    }
}
