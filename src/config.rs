use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_PACKAGE_MANAGER: &str = "npm";
const DEFAULT_VITE_VERSION: &str = "latest";

/// User settings read from `$XDG_CONFIG_HOME/byteforge/config.toml`.
///
/// Every field is optional in the file; command-line flags and their
/// environment variables take precedence (see [`Settings::with_overrides`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Package manager used for `create vite` and dependency installs.
    #[serde(default = "default_package_manager")]
    pub package_manager: String,
    /// Directory holding `project-base/` and `react-app/`; bundled templates when unset.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
    /// Version tag passed to `create vite@<tag>`.
    #[serde(default = "default_vite_version")]
    pub vite_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
            templates_dir: None,
            vite_version: default_vite_version(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let mut settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        settings.templates_dir = settings.templates_dir.map(|dir| expand_home(&dir));
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load_default() -> Result<Self> {
        Self::load(&config_path()?)
    }

    pub fn with_overrides(
        mut self,
        package_manager: Option<String>,
        templates_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(pm) = package_manager.filter(|pm| !pm.trim().is_empty()) {
            self.package_manager = pm;
        }
        if let Some(dir) = templates_dir {
            self.templates_dir = Some(expand_home(&dir));
        }
        self
    }
}

/// Path of the user config file (`$XDG_CONFIG_HOME/byteforge/config.toml`)
pub fn config_path() -> Result<PathBuf> {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => directories::BaseDirs::new()
            .context("Failed to get home directory")?
            .home_dir()
            .join(".config"),
    };

    Ok(base.join("byteforge").join("config.toml"))
}

fn expand_home(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

fn default_package_manager() -> String {
    DEFAULT_PACKAGE_MANAGER.to_string()
}

fn default_vite_version() -> String {
    DEFAULT_VITE_VERSION.to_string()
}
