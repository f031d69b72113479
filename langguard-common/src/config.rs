//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`LANGGUARD_ROOT_FOLDER`, then `LANGGUARD_ROOT`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Primary environment variable for the root folder
pub const ROOT_FOLDER_ENV: &str = "LANGGUARD_ROOT_FOLDER";

/// Short alias accepted for the root folder
pub const ROOT_FOLDER_ENV_ALIAS: &str = "LANGGUARD_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "langguard.db";

/// Upload area inside the root folder
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// Logging section shared by every module's TOML file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/langguard (or /var/lib/langguard for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("langguard"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/langguard"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/langguard
        dirs::data_dir()
            .map(|d| d.join("langguard"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/langguard"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\langguard
        dirs::data_local_dir()
            .map(|d| d.join("langguard"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\langguard"))
    } else {
        PathBuf::from("./langguard_data")
    }
}

/// Default TOML path for a module: `<config dir>/langguard/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("langguard").join(format!("{}.toml", module_name)))
}

/// Resolves the root folder following the priority order in the module docs
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_override: Option<PathBuf>,
    toml_root_folder: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_override: None,
            toml_root_folder: None,
        }
    }

    /// Command-line value, highest priority
    pub fn with_cli_override(mut self, path: Option<PathBuf>) -> Self {
        self.cli_override = path;
        self
    }

    /// `root_folder` value read from the module's TOML file
    pub fn with_toml_root_folder(mut self, path: Option<PathBuf>) -> Self {
        self.toml_root_folder = path;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_override {
            info!(module = %self.module_name, "Root folder from command line: {}", path.display());
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_FOLDER_ENV_ALIAS] {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    info!(module = %self.module_name, "Root folder from {}: {}", var, value);
                    return PathBuf::from(value);
                }
            }
        }

        if let Some(path) = &self.toml_root_folder {
            info!(module = %self.module_name, "Root folder from TOML config: {}", path.display());
            return path.clone();
        }

        let path = CompiledDefaults::for_current_platform().root_folder;
        info!(module = %self.module_name, "Root folder from compiled default: {}", path.display());
        path
    }
}

/// Creates the root folder layout on startup
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder and the upload area if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.uploads_path())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.root_folder.join(UPLOADS_DIR_NAME)
    }
}

/// Load a TOML config file
///
/// A missing file is not an error: the caller gets `Ok(None)` and runs on
/// defaults. A file that exists but fails to parse is a `Config` error.
pub fn load_toml_config<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        warn!("Config file not found, using defaults: {}", path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// Write a TOML config file atomically (temp file + rename)
pub fn write_toml_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializer_paths_live_under_root() {
        let init = RootFolderInitializer::new(PathBuf::from("/srv/langguard"));
        assert_eq!(init.database_path(), PathBuf::from("/srv/langguard/langguard.db"));
        assert_eq!(init.uploads_path(), PathBuf::from("/srv/langguard/uploads"));
    }

    #[test]
    fn cli_override_beats_everything() {
        let resolver = RootFolderResolver::new("test")
            .with_cli_override(Some(PathBuf::from("/from/cli")))
            .with_toml_root_folder(Some(PathBuf::from("/from/toml")));
        assert_eq!(resolver.resolve(), PathBuf::from("/from/cli"));
    }

    #[test]
    fn logging_defaults_to_info() {
        assert_eq!(LoggingConfig::default().level, "info");
    }
}
