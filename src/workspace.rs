use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::aliases::{TSCONFIG_BASE, VITE_CONFIG_BASE};
use crate::config::Settings;
use crate::process::PackageManager;
use crate::templates::Templates;

/// Workspace path types
#[derive(Debug, Clone, Copy)]
pub enum WorkspacePath {
    /// Root manifest: root/package.json
    PackageJson,
    /// Applications: root/apps
    Apps,
    /// Shared compiler options and path aliases: root/tsconfig.base.json
    TsConfigBase,
    /// Shared Vite config: root/vite.config.base.ts
    ViteConfigBase,
}

/// Workspace - the directory a command operates on, plus the resolved
/// settings every command needs (templates, package manager, runtime).
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    templates: Templates,
    package_manager: PackageManager,
    vite_version: String,
    runtime: Runtime,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, settings: &Settings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;

        Ok(Self {
            root: root.into(),
            templates: Templates::new(settings.templates_dir.clone()),
            package_manager: PackageManager::new(settings.package_manager.clone()),
            vite_version: settings.vite_version.clone(),
            runtime,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get path for a specific workspace location
    pub fn path(&self, path_type: WorkspacePath) -> PathBuf {
        match path_type {
            WorkspacePath::PackageJson => self.root.join("package.json"),
            WorkspacePath::Apps => self.root.join("apps"),
            WorkspacePath::TsConfigBase => self.root.join(TSCONFIG_BASE),
            WorkspacePath::ViteConfigBase => self.root.join(VITE_CONFIG_BASE),
        }
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    pub fn package_manager(&self) -> &PackageManager {
        &self.package_manager
    }

    pub fn vite_version(&self) -> &str {
        &self.vite_version
    }

    /// Drive an async filesystem batch to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
