use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs an external program to completion.
///
/// Implementations block until the process exits; a non-zero exit status is
/// an error. There is no timeout and no retry.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<()>;
}

/// Spawns real processes that share this process's stdin, stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<()> {
        let line = command_line(program, args);
        tracing::debug!(command = %line, cwd = %cwd.display(), "spawning");

        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to start `{line}`"))?;

        if !status.success() {
            bail!("`{line}` exited with {status}");
        }
        Ok(())
    }
}

/// Render a command for display, e.g. `npm install --save-dev eslint`.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The package manager CLI driving scaffolding and installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    program: String,
}

impl PackageManager {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn is_npm(&self) -> bool {
        self.program == "npm"
    }

    /// `create vite@<version> <name> -- --template react-ts`
    pub fn create_vite_args(&self, app_name: &str, vite_version: &str) -> Vec<String> {
        vec![
            "create".to_string(),
            format!("vite@{vite_version}"),
            app_name.to_string(),
            "--".to_string(),
            "--template".to_string(),
            "react-ts".to_string(),
        ]
    }

    /// `install [--save-dev] <packages...>` (`add [-D]` for pnpm, yarn and bun).
    pub fn install_args(&self, packages: &[&str], dev: bool) -> Vec<String> {
        let mut args = Vec::with_capacity(packages.len() + 2);
        if self.is_npm() {
            args.push("install".to_string());
            if dev {
                args.push("--save-dev".to_string());
            }
        } else {
            args.push("add".to_string());
            if dev {
                args.push("-D".to_string());
            }
        }
        args.extend(packages.iter().map(|pkg| pkg.to_string()));
        args
    }

    /// `run <script>`
    pub fn run_script_args(&self, script: &str) -> Vec<String> {
        vec!["run".to_string(), script.to_string()]
    }

    pub fn display(&self, args: &[String]) -> String {
        command_line(&self.program, args)
    }
}
