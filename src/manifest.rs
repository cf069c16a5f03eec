use anyhow::{Context, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The parts of a `package.json` this tool reads or edits.
///
/// Known fields are declared in the order npm writes them so a rewrite keeps
/// the familiar layout; everything else round-trips through `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    /// Kept untyped: only "is it an array" matters for monorepo detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_dependencies: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl PackageJson {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// True when `workspaces` is declared as an array of globs.
    pub fn has_workspaces(&self) -> bool {
        matches!(self.workspaces, Some(Value::Array(_)))
    }

    /// Drop the given packages from `devDependencies`; returns how many were present.
    pub fn remove_dev_dependencies(&mut self, packages: &[&str]) -> usize {
        let Some(dev) = self.dev_dependencies.as_mut() else {
            return 0;
        };
        packages
            .iter()
            .filter(|pkg| dev.remove(**pkg).is_some())
            .count()
    }

    /// Drop a script entry; returns whether it existed.
    pub fn remove_script(&mut self, script: &str) -> bool {
        self.scripts
            .as_mut()
            .map(|scripts| scripts.remove(script).is_some())
            .unwrap_or(false)
    }
}

/// Lower-case a name and replace every whitespace run with a single `-`.
///
/// Leading and trailing runs become hyphens too: `" My  App "` is `-my-app-`.
pub fn slugify(name: &str) -> Result<String> {
    let whitespace = Regex::new(r"\s+").context("Invalid whitespace pattern")?;
    Ok(whitespace.replace_all(&name.to_lowercase(), "-").into_owned())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
}

/// Write `value` as two-space indented JSON followed by a newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut contents = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}
