use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aliases::{self, AliasKind, ViteAliasUpdate};
use crate::manifest::{write_json, PackageJson};
use crate::templates::{REACT_APP_SRC, REACT_APP_VITE_CONFIG};
use crate::tsconfig::{PackageTsConfig, SecondaryTsConfig, BASE_CONFIG_FROM_PACKAGE};
use crate::ui;
use crate::workspace::{Workspace, WorkspacePath};

/// Lint tooling dropped from new apps; the monorepo root lints everything.
pub const LINT_PACKAGES: &[&str] = &[
    "eslint",
    "@eslint/js",
    "eslint-plugin-react-hooks",
    "eslint-plugin-react-refresh",
    "typescript-eslint",
    "globals",
];

/// Normalises a freshly scaffolded app for life inside the monorepo.
pub struct Configurator<'a> {
    workspace: &'a Workspace,
    app_name: &'a str,
    app_dir: PathBuf,
}

impl<'a> Configurator<'a> {
    pub fn new(workspace: &'a Workspace, app_name: &'a str, app_dir: &Path) -> Self {
        Self {
            workspace,
            app_name,
            app_dir: app_dir.to_path_buf(),
        }
    }

    /// Run every step, warning about failures; returns the number that failed.
    pub fn run(&self) -> usize {
        ui::status("Configuring", format!("apps/{} for the monorepo", self.app_name));

        // Run in order; each step still runs if an earlier one failed
        let steps: [(&str, fn(&Self) -> Result<()>); 6] = [
            ("remove app ESLint configuration", Self::remove_lint_config),
            ("update TypeScript configuration", Self::update_tsconfig),
            ("replace Vite configuration", Self::replace_vite_config),
            ("replace src folder", Self::replace_src),
            ("register TypeScript path alias", Self::register_ts_alias),
            ("register Vite alias", Self::register_vite_alias),
        ];

        let mut failed = 0;
        for (label, step) in steps {
            if let Err(err) = step(self) {
                failed += 1;
                tracing::debug!(step = label, "configuration step failed: {err:#}");
                ui::warn(format!("Failed to {label}: {err:#}"));
            }
        }

        if failed == 0 {
            ui::success("Configured", "app for the monorepo");
        }
        failed
    }

    pub fn remove_lint_config(&self) -> Result<()> {
        let eslint_config = self.app_dir.join("eslint.config.js");
        if eslint_config.exists() {
            fs::remove_file(&eslint_config)
                .with_context(|| format!("Failed to remove {:?}", eslint_config))?;
            ui::success("Removed", "eslint.config.js (using monorepo ESLint)");
        }

        let package_path = self.app_dir.join("package.json");
        if package_path.exists() {
            let mut package = PackageJson::load(&package_path)?;
            package.remove_dev_dependencies(LINT_PACKAGES);
            package.remove_script("lint");
            package.save(&package_path)?;
            ui::success("Removed", "ESLint packages from package.json");
        }

        Ok(())
    }

    pub fn update_tsconfig(&self) -> Result<()> {
        let tsconfig = self.app_dir.join("tsconfig.json");
        if tsconfig.exists() {
            write_json(&tsconfig, &PackageTsConfig::extending_base())?;
            ui::success("Updated", "tsconfig.json to extend monorepo base");
        }

        let app_tsconfig = self.app_dir.join("tsconfig.app.json");
        if app_tsconfig.exists() {
            match SecondaryTsConfig::load(&app_tsconfig) {
                Ok(mut config) => {
                    config.extends = Some(BASE_CONFIG_FROM_PACKAGE.to_string());
                    write_json(&app_tsconfig, &config)?;
                    ui::success("Updated", "tsconfig.app.json to extend monorepo base");
                }
                Err(err) => {
                    tracing::debug!("tsconfig.app.json left as is: {err:#}");
                    ui::info("Skipped tsconfig.app.json update due to format issues");
                }
            }
        }

        Ok(())
    }

    pub fn replace_vite_config(&self) -> Result<()> {
        let templates = self.workspace.templates();
        if !templates.exists(REACT_APP_VITE_CONFIG) {
            ui::warn("Template vite.config.ts not found, keeping existing");
            return Ok(());
        }

        templates.copy_file(REACT_APP_VITE_CONFIG, &self.app_dir.join("vite.config.ts"))?;
        ui::success("Updated", "vite.config.ts from template");
        Ok(())
    }

    pub fn replace_src(&self) -> Result<()> {
        let templates = self.workspace.templates();
        if !templates.exists(REACT_APP_SRC) {
            ui::warn("Template src folder not found, keeping existing");
            return Ok(());
        }

        let src = self.app_dir.join("src");
        if src.exists() {
            fs::remove_dir_all(&src).with_context(|| format!("Failed to remove {:?}", src))?;
        }
        templates.copy_tree(REACT_APP_SRC, &src)?;
        ui::success("Replaced", "src folder with template version");
        Ok(())
    }

    pub fn register_ts_alias(&self) -> Result<()> {
        let tsconfig_base = self.workspace.path(WorkspacePath::TsConfigBase);
        if aliases::register_ts_path(&tsconfig_base, self.app_name, AliasKind::Apps)? {
            ui::success(
                "Aliased",
                format!("@{} in {}", self.app_name, aliases::TSCONFIG_BASE),
            );
        }
        Ok(())
    }

    pub fn register_vite_alias(&self) -> Result<()> {
        let vite_base = self.workspace.path(WorkspacePath::ViteConfigBase);
        let update = aliases::register_vite_alias(&vite_base, self.app_name, AliasKind::Apps)?;
        match update {
            ViteAliasUpdate::Added => ui::success(
                "Aliased",
                format!(
                    "@{} in {} ({})",
                    self.app_name,
                    aliases::VITE_CONFIG_BASE,
                    AliasKind::Apps
                ),
            ),
            ViteAliasUpdate::AlreadyPresent
            | ViteAliasUpdate::NoConfigFile
            | ViteAliasUpdate::NoDeclaration => {
                tracing::debug!(?update, "vite alias list unchanged");
            }
        }
        Ok(())
    }
}
