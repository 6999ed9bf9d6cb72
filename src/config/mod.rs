//! Configuration for Orchestra
//!
//! Two sources feed the shell: the system-wide [`Settings`] file written by
//! `config/update-config.sh`, and the outer command line ([`CliOptions`]).
//! Both are read once at startup and passed by reference from then on.

pub mod options;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{OrchestraError, Result};

pub use options::CliOptions;

/// Fixed location of the system settings file.
pub const SETTINGS_PATH: &str = "/etc/orchestra/settings.json";

/// Environment variable that overrides [`SETTINGS_PATH`].
pub const SETTINGS_ENV: &str = "ORCHESTRA_SETTINGS";

/// Script that (re)generates the settings file, relative to the repo root.
pub const UPDATE_CONFIG_SCRIPT: &str = "config/update-config.sh";

/// Operating system identifier that selects the packaged install paths.
pub const PACKAGED_OS: &str = "Kali";

/// Process-wide settings loaded from `settings.json`.
///
/// # Example
///
/// ```json
/// {
///   "operating_system": "Kali",
///   "distro": "kali-rolling",
///   "install_path": "/usr/share/orchestra",
///   "terminal_clear": true,
///   "temp_dir": "/tmp",
///   "output_path": "/var/lib/orchestra/output"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Operating system identifier used to pick package manager and paths.
    pub operating_system: String,

    /// Distribution name, informational only.
    #[serde(default)]
    pub distro: Option<String>,

    /// Directory the packaged install lives in.
    #[serde(default = "default_install_path")]
    pub install_path: PathBuf,

    /// Whether the title screen clears the terminal first.
    #[serde(default = "default_terminal_clear")]
    pub terminal_clear: bool,

    /// Scratch directory handed to tools.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Where tools write their artifacts.
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Package installed by the update action on packaged systems.
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Additional settings written by the setup script and consumed by tools.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_install_path() -> PathBuf {
    PathBuf::from("/usr/share/orchestra")
}

fn default_terminal_clear() -> bool {
    true
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_package_name() -> String {
    "orchestra".to_string()
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// # Errors
    /// - `OrchestraError::ConfigMissing` if the file does not exist
    /// - `OrchestraError::Config` if it cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OrchestraError::ConfigMissing {
                path: path.to_path_buf(),
                remediation: remediation_command(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| {
            OrchestraError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            OrchestraError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        if settings.operating_system.trim().is_empty() {
            return Err(OrchestraError::Config(format!(
                "{} has an empty operating_system",
                path.display()
            )));
        }

        debug!(path = %path.display(), os = %settings.operating_system, "Loaded settings");
        Ok(settings)
    }

    /// Whether this is the packaged (distribution) install.
    pub fn is_packaged(&self) -> bool {
        self.operating_system == PACKAGED_OS
    }

    /// Every non-internal setting as `(name, value)` pairs.
    ///
    /// Declared fields come first in declaration order, then `extra` keys in
    /// sorted order. Keys starting with `_` are internal and skipped.
    pub fn options(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("operating_system".to_string(), self.operating_system.clone()),
            (
                "distro".to_string(),
                self.distro.clone().unwrap_or_else(|| "None".to_string()),
            ),
            (
                "install_path".to_string(),
                self.install_path.display().to_string(),
            ),
            ("terminal_clear".to_string(), self.terminal_clear.to_string()),
            ("temp_dir".to_string(), self.temp_dir.display().to_string()),
            (
                "output_path".to_string(),
                self.output_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ),
            ("package_name".to_string(), self.package_name.clone()),
        ];

        for (key, value) in &self.extra {
            if key.starts_with('_') {
                continue;
            }
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push((key.clone(), rendered));
        }

        out
    }
}

/// Absolute path of the script that regenerates the settings file.
pub fn remediation_command() -> String {
    std::env::current_dir()
        .map(|dir| dir.join(UPDATE_CONFIG_SCRIPT))
        .unwrap_or_else(|_| PathBuf::from(UPDATE_CONFIG_SCRIPT))
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_settings(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("settings.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_missing_settings_reports_remediation() {
        let tmp = TempDir::new().unwrap();
        let result = Settings::load(&tmp.path().join("settings.json"));
        match result {
            Err(OrchestraError::ConfigMissing { path, remediation }) => {
                assert!(path.ends_with("settings.json"));
                assert!(remediation.ends_with(UPDATE_CONFIG_SCRIPT));
            }
            other => panic!("expected ConfigMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_load_minimal_settings_applies_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write_settings(&tmp, r#"{"operating_system": "Ubuntu"}"#);

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.operating_system, "Ubuntu");
        assert_eq!(settings.install_path, PathBuf::from("/usr/share/orchestra"));
        assert!(settings.terminal_clear);
        assert_eq!(settings.temp_dir, PathBuf::from("/tmp"));
        assert_eq!(settings.package_name, "orchestra");
        assert!(settings.extra.is_empty());
        assert!(!settings.is_packaged());
    }

    #[test]
    fn test_load_malformed_settings() {
        let tmp = TempDir::new().unwrap();
        let path = write_settings(&tmp, "{ not json");
        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(err, OrchestraError::Config(_)));
    }

    #[test]
    fn test_load_empty_operating_system_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_settings(&tmp, r#"{"operating_system": "  "}"#);
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("empty operating_system"));
    }

    #[test]
    fn test_is_packaged() {
        let tmp = TempDir::new().unwrap();
        let path = write_settings(&tmp, r#"{"operating_system": "Kali"}"#);
        assert!(Settings::load(&path).unwrap().is_packaged());
    }

    #[test]
    fn test_options_lists_fields_then_extras_skipping_internal() {
        let tmp = TempDir::new().unwrap();
        let path = write_settings(
            &tmp,
            r#"{
                "operating_system": "Kali",
                "terminal_clear": false,
                "msf_path": "/opt/metasploit",
                "_generated_by": "update-config.sh",
                "wine_arch": 32
            }"#,
        );
        let settings = Settings::load(&path).unwrap();
        let options = settings.options();

        assert_eq!(options[0], ("operating_system".into(), "Kali".into()));
        assert!(options.contains(&("terminal_clear".into(), "false".into())));
        assert!(options.contains(&("distro".into(), "None".into())));

        let names: Vec<&str> = options.iter().map(|(k, _)| k.as_str()).collect();
        let msf = names.iter().position(|n| *n == "msf_path").unwrap();
        let wine = names.iter().position(|n| *n == "wine_arch").unwrap();
        assert!(msf < wine);
        assert!(!names.contains(&"_generated_by"));
        assert!(options.contains(&("msf_path".into(), "/opt/metasploit".into())));
        assert!(options.contains(&("wine_arch".into(), "32".into())));
    }
}
