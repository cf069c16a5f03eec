use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::configure::Configurator;
use crate::fsutil;
use crate::manifest::PackageJson;
use crate::process::CommandRunner;
use crate::ui::{self, Progress, Prompt};
use crate::workspace::{Workspace, WorkspacePath};
use crate::Outcome;

/// Runtime packages added to every new app.
pub const RUNTIME_DEPENDENCIES: &[&str] = &[
    "react-router",
    "@mui/material",
    "@emotion/react",
    "@emotion/styled",
    "@mui/icons-material",
    "@reduxjs/toolkit",
    "react-redux",
];

/// Type packages added as dev dependencies.
pub const DEV_DEPENDENCIES: &[&str] = &["@types/react-router", "@types/react-redux"];

const DEFAULT_WORKSPACE_NAME: &str = "workspace";

/// The monorepo root a new app is added to.
#[derive(Debug, Clone)]
pub struct Monorepo {
    root: PathBuf,
    manifest: Option<PackageJson>,
}

impl Monorepo {
    /// Accept the workspace root when its `package.json` declares a
    /// `workspaces` array or an `apps/` directory exists. An unreadable root
    /// manifest counts as absent.
    pub fn detect(workspace: &Workspace) -> Result<Self> {
        let manifest_path = workspace.path(WorkspacePath::PackageJson);
        let manifest = if manifest_path.exists() {
            match PackageJson::load(&manifest_path) {
                Ok(manifest) => Some(manifest),
                Err(err) => {
                    tracing::debug!("ignoring unreadable root package.json: {err:#}");
                    None
                }
            }
        } else {
            None
        };

        let has_workspaces = manifest.as_ref().is_some_and(PackageJson::has_workspaces);
        if !has_workspaces && !workspace.path(WorkspacePath::Apps).is_dir() {
            bail!(
                "Not a monorepo: this command should be run from the root of a monorepo project. \
                 No apps directory or workspace configuration found."
            );
        }

        Ok(Self {
            root: workspace.root().to_path_buf(),
            manifest,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scope used for app package names: the root package name without a
    /// leading `@` and anything after the first `/`.
    pub fn workspace_name(&self) -> String {
        self.manifest
            .as_ref()
            .and_then(|manifest| manifest.name.as_deref())
            .map(|name| name.trim_start_matches('@'))
            .and_then(|name| name.split('/').next())
            .filter(|scope| !scope.is_empty())
            .unwrap_or(DEFAULT_WORKSPACE_NAME)
            .to_string()
    }
}

/// Reject names that would escape `apps/` or that npm cannot use.
pub fn validate_app_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("App name must not be empty");
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("Invalid app name '{name}': must be a single directory name");
    }
    Ok(())
}

/// Adds a Vite + React + TypeScript app under `apps/`.
pub struct AppCreator<'a> {
    workspace: &'a Workspace,
    prompt: &'a dyn Prompt,
    runner: &'a dyn CommandRunner,
}

impl<'a> AppCreator<'a> {
    pub fn new(
        workspace: &'a Workspace,
        prompt: &'a dyn Prompt,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            workspace,
            prompt,
            runner,
        }
    }

    pub fn create(&self, app_name: &str) -> Result<Outcome> {
        validate_app_name(app_name)?;
        let monorepo = Monorepo::detect(self.workspace)?;

        let apps_dir = self.workspace.path(WorkspacePath::Apps);
        let app_dir = apps_dir.join(app_name);

        if fsutil::is_non_empty_dir(&app_dir)? {
            let message = format!(
                "App \"{app_name}\" already exists and is not empty. Delete contents and recreate?"
            );
            if !self.prompt.confirm(&message, false)? {
                return Ok(Outcome::Cancelled);
            }
            fs::remove_dir_all(&app_dir)
                .with_context(|| format!("Failed to remove {:?}", app_dir))?;
            ui::status("Removed", format!("existing apps/{app_name}"));
        }

        self.scaffold(&monorepo, &apps_dir, app_name)
            .map_err(|err| anyhow!("Failed to create app: {err:#}"))?;

        self.install_dependencies(&app_dir);
        Configurator::new(self.workspace, app_name, &app_dir).run();

        ui::success(
            "Created",
            format!("Successfully created app \"{app_name}\" in apps/{app_name}"),
        );
        self.print_next_steps(app_name);
        Ok(Outcome::Created)
    }

    fn scaffold(&self, monorepo: &Monorepo, apps_dir: &Path, app_name: &str) -> Result<()> {
        fs::create_dir_all(apps_dir)
            .with_context(|| format!("Failed to create directory {:?}", apps_dir))?;

        let pm = self.workspace.package_manager();
        let args = pm.create_vite_args(app_name, self.workspace.vite_version());
        let progress = Progress::new(
            "Scaffolding",
            format!("React app \"{app_name}\" with Vite + TypeScript ({})", pm.display(&args)),
        );
        if let Err(err) = self.runner.run(pm.program(), &args, apps_dir) {
            progress.fail("Failed", &err);
            return Err(err);
        }
        progress.success("Scaffolded");

        let package_path = apps_dir.join(app_name).join("package.json");
        if package_path.exists() {
            let mut package = PackageJson::load(&package_path)?;
            package.name = Some(format!("@{}/{app_name}", monorepo.workspace_name()));
            package.save(&package_path)?;
        }

        Ok(())
    }

    /// Install the extra packages; failures are reported and skipped.
    fn install_dependencies(&self, app_dir: &Path) {
        let pm = self.workspace.package_manager();
        let batches = [
            ("dependencies", pm.install_args(RUNTIME_DEPENDENCIES, false)),
            ("dev dependencies", pm.install_args(DEV_DEPENDENCIES, true)),
        ];

        let mut all_installed = true;
        for (label, args) in batches {
            let progress = Progress::new("Installing", label);
            match self.runner.run(pm.program(), &args, app_dir) {
                Ok(()) => progress.success("Installed"),
                Err(err) => {
                    all_installed = false;
                    tracing::debug!("installing {label} failed: {err:#}");
                    progress.fail("Warning", format!("{err:#}"));
                }
            }
        }

        if !all_installed {
            ui::warn(format!(
                "Failed to install some additional packages. You can install them manually later with:\n  {}\n  {}",
                pm.display(&pm.install_args(RUNTIME_DEPENDENCIES, false)),
                pm.display(&pm.install_args(DEV_DEPENDENCIES, true)),
            ));
        }
    }

    fn print_next_steps(&self, app_name: &str) {
        let pm = self.workspace.package_manager();
        ui::hint(
            "Next steps",
            &[
                format!("cd apps/{app_name}"),
                pm.display(&pm.install_args(&[], false)),
                pm.display(&pm.run_script_args("dev")),
            ],
        );
    }
}
