use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fsutil;
use crate::manifest::{slugify, PackageJson};
use crate::templates::PROJECT_BASE;
use crate::ui::{self, Prompt};
use crate::workspace::Workspace;
use crate::Outcome;

const FALLBACK_PROJECT_NAME: &str = "my-project";

/// Where `create <project>` puts the new monorepo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectTarget {
    /// `.` or `./`: initialise in place; the directory itself is never removed.
    CurrentDir { dir: PathBuf },
    /// A new (or reset) subdirectory of the current directory.
    NewDir { name: String, dir: PathBuf },
}

impl ProjectTarget {
    /// A leading `./` on a directory name is dropped, so `./app` targets `cwd/app`.
    pub fn parse(name: &str, cwd: &Path) -> Self {
        if name == "." || name == "./" {
            ProjectTarget::CurrentDir {
                dir: cwd.to_path_buf(),
            }
        } else {
            let name = name.strip_prefix("./").unwrap_or(name);
            ProjectTarget::NewDir {
                name: name.to_string(),
                dir: cwd.join(name),
            }
        }
    }

    pub fn dir(&self) -> &Path {
        match self {
            ProjectTarget::CurrentDir { dir } | ProjectTarget::NewDir { dir, .. } => dir,
        }
    }

    pub fn is_current_dir(&self) -> bool {
        matches!(self, ProjectTarget::CurrentDir { .. })
    }

    pub fn display_name(&self) -> String {
        match self {
            ProjectTarget::CurrentDir { .. } => "current directory".to_string(),
            ProjectTarget::NewDir { name, .. } => name.clone(),
        }
    }

    /// The `name` written into the copied `package.json`.
    pub fn package_name(&self) -> Result<String> {
        match self {
            ProjectTarget::CurrentDir { dir } => {
                let folder = dir
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string());
                slugify(&folder)
            }
            ProjectTarget::NewDir { name, .. } => slugify(name),
        }
    }
}

/// Creates or resets a monorepo from the `project-base` template.
pub struct ProjectCreator<'a> {
    workspace: &'a Workspace,
    prompt: &'a dyn Prompt,
}

impl<'a> ProjectCreator<'a> {
    pub fn new(workspace: &'a Workspace, prompt: &'a dyn Prompt) -> Self {
        Self { workspace, prompt }
    }

    pub fn create(&self, name: &str, skip_confirmation: bool) -> Result<Outcome> {
        let target = ProjectTarget::parse(name, self.workspace.root());
        let dir = target.dir();

        if dir.exists() {
            let removable = fsutil::removable_entries(dir)?;
            if !removable.is_empty() {
                if !skip_confirmation {
                    let message = match &target {
                        ProjectTarget::CurrentDir { .. } => {
                            "Current directory is not empty. Delete all contents and initialize project?"
                                .to_string()
                        }
                        ProjectTarget::NewDir { name, .. } => format!(
                            "Directory \"{name}\" is not empty. Delete all contents and initialize project?"
                        ),
                    };
                    if !self.prompt.confirm(&message, false)? {
                        return Ok(Outcome::Cancelled);
                    }
                }

                let removed = self
                    .workspace
                    .block_on(fsutil::clear_directory(dir))
                    .with_context(|| format!("Failed to clear {:?}", dir))?;
                tracing::debug!(removed, dir = %dir.display(), "cleared target directory");
                ui::status("Cleared", "Directory contents cleared.");
            }
        } else if !target.is_current_dir() && !skip_confirmation {
            let message = format!(
                "Create new project \"{}\" in {}?",
                target.display_name(),
                dir.display()
            );
            if !self.prompt.confirm(&message, true)? {
                return Ok(Outcome::Cancelled);
            }
        }

        self.populate(&target)
            .map_err(|err| anyhow!("Failed to create project: {err:#}"))?;

        ui::success(
            "Created",
            format!("Successfully created project in {}", target.display_name()),
        );
        self.print_next_steps(&target);
        Ok(Outcome::Created)
    }

    fn populate(&self, target: &ProjectTarget) -> Result<()> {
        let dir = target.dir();
        if !target.is_current_dir() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
        }

        let written = self.workspace.templates().copy_tree(PROJECT_BASE, dir)?;
        tracing::debug!(written, dir = %dir.display(), "copied project template");

        let package_path = dir.join("package.json");
        if package_path.exists() {
            let mut package = PackageJson::load(&package_path)?;
            package.name = Some(target.package_name()?);
            package.save(&package_path)?;
        }

        Ok(())
    }

    fn print_next_steps(&self, target: &ProjectTarget) {
        let pm = self.workspace.package_manager();
        let mut steps = Vec::new();
        if let ProjectTarget::NewDir { name, .. } = target {
            steps.push(format!("cd {name}"));
        }
        steps.push(pm.display(&pm.install_args(&[], false)));
        steps.push(pm.display(&pm.run_script_args("build")));
        ui::hint("Next steps", &steps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::ui::ScriptedPrompt;
    use rstest::rstest;
    use tempfile::TempDir;

    fn workspace(root: &Path) -> Workspace {
        Workspace::new(root, &Settings::default()).unwrap()
    }

    fn package_name(dir: &Path) -> String {
        PackageJson::load(&dir.join("package.json"))
            .unwrap()
            .name
            .unwrap()
    }

    #[rstest]
    #[case(".", true)]
    #[case("./", true)]
    #[case("my-app", false)]
    #[case(".hidden", false)]
    fn test_parse_target(#[case] name: &str, #[case] current: bool) {
        let target = ProjectTarget::parse(name, Path::new("/work/Some Folder"));
        assert_eq!(target.is_current_dir(), current);
    }

    #[test]
    fn test_target_names() {
        let cwd = Path::new("/work/Some Folder");

        let current = ProjectTarget::parse(".", cwd);
        assert_eq!(current.dir(), cwd);
        assert_eq!(current.display_name(), "current directory");
        assert_eq!(current.package_name().unwrap(), "some-folder");

        let dotted = ProjectTarget::parse("./app", cwd);
        assert_eq!(dotted.dir(), cwd.join("app"));
        assert_eq!(dotted.package_name().unwrap(), "app");

        let named = ProjectTarget::parse("My Cool App", cwd);
        assert_eq!(named.dir(), cwd.join("My Cool App"));
        assert_eq!(named.display_name(), "My Cool App");
        assert_eq!(named.package_name().unwrap(), "my-cool-app");

        let padded = ProjectTarget::parse(" My  App ", cwd);
        assert_eq!(padded.package_name().unwrap(), "-my-app-");

        let root = ProjectTarget::parse(".", Path::new("/"));
        assert_eq!(root.package_name().unwrap(), "my-project");
    }

    #[test]
    fn test_create_new_directory_skipping_confirmation() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path());
        let prompt = ScriptedPrompt::default();

        let outcome = ProjectCreator::new(&ws, &prompt)
            .create("My Cool App", true)
            .unwrap();

        let dir = temp.path().join("My Cool App");
        assert_eq!(outcome, Outcome::Created);
        assert!(prompt.asked().is_empty());
        assert_eq!(package_name(&dir), "my-cool-app");
        assert!(dir.join("tsconfig.base.json").exists());
        assert!(dir.join("vite.config.base.ts").exists());
        assert!(dir.join("apps").is_dir());
    }

    #[test]
    fn test_create_new_directory_asks_first() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path());
        let prompt = ScriptedPrompt::new([false]);

        let outcome = ProjectCreator::new(&ws, &prompt).create("demo", false).unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(prompt.asked().len(), 1);
        assert!(prompt.asked()[0].starts_with("Create new project \"demo\""));
        assert!(!temp.path().join("demo").exists());
    }

    #[test]
    fn test_declining_reset_leaves_directory_untouched() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("demo");
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("src/index.ts"), "keep me").unwrap();
        let ws = workspace(temp.path());
        let prompt = ScriptedPrompt::new([false]);

        let outcome = ProjectCreator::new(&ws, &prompt).create("demo", false).unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(
            prompt.asked(),
            vec!["Directory \"demo\" is not empty. Delete all contents and initialize project?"]
        );
        assert_eq!(fs::read_to_string(dir.join("src/index.ts")).unwrap(), "keep me");
        assert_eq!(fsutil::list_entries(&dir).unwrap().len(), 1);
    }

    #[test]
    fn test_confirmed_reset_clears_non_git_entries() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("demo");
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::write(dir.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(dir.join(".gitignore"), "custom-ignore").unwrap();
        fs::write(dir.join("stale.txt"), "old").unwrap();
        let ws = workspace(temp.path());
        let prompt = ScriptedPrompt::new([true]);

        ProjectCreator::new(&ws, &prompt).create("demo", false).unwrap();

        assert!(!dir.join("stale.txt").exists());
        assert!(dir.join(".git/HEAD").exists());
        assert!(dir.join("package.json").exists());
        assert_eq!(package_name(&dir), "demo");
    }

    #[test]
    fn test_git_only_directory_needs_no_prompt() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("demo");
        fs::create_dir_all(dir.join(".git")).unwrap();
        let ws = workspace(temp.path());
        let prompt = ScriptedPrompt::default();

        ProjectCreator::new(&ws, &prompt).create("demo", false).unwrap();

        assert!(prompt.asked().is_empty());
        assert!(dir.join("package.json").exists());
    }

    #[test]
    fn test_current_directory_mode() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("Team Portal");
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::write(dir.join("notes.md"), "old").unwrap();
        let ws = workspace(&dir);
        let prompt = ScriptedPrompt::default();

        let outcome = ProjectCreator::new(&ws, &prompt).create("./", true).unwrap();

        assert_eq!(outcome, Outcome::Created);
        assert!(dir.is_dir());
        assert!(dir.join(".git").is_dir());
        assert!(!dir.join("notes.md").exists());
        assert_eq!(package_name(&dir), "team-portal");
    }

    #[test]
    fn test_copy_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let settings =
            Settings::default().with_overrides(None, Some(temp.path().join("no-templates")));
        let ws = Workspace::new(temp.path(), &settings).unwrap();
        let prompt = ScriptedPrompt::default();

        let err = ProjectCreator::new(&ws, &prompt)
            .create("demo", true)
            .unwrap_err();

        assert!(err.to_string().starts_with("Failed to create project: "));
    }
}
