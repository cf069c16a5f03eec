use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A `byteforge` invocation isolated from the user's config and environment.
fn byteforge(cwd: &Path, config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("byteforge").unwrap();
    cmd.current_dir(cwd)
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env("NO_COLOR", "1")
        .env_remove("BYTEFORGE_PACKAGE_MANAGER")
        .env_remove("BYTEFORGE_TEMPLATES")
        .env_remove("RUST_LOG");
    cmd
}

fn package_name(dir: &Path) -> String {
    let contents = fs::read_to_string(dir.join("package.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    value["name"].as_str().unwrap().to_string()
}

#[test]
fn test_help_output() {
    let config = TempDir::new().unwrap();
    byteforge(config.path(), config.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"));

    byteforge(config.path(), config.path())
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app"))
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_version_flag() {
    let config = TempDir::new().unwrap();
    byteforge(config.path(), config.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_create_requires_project_name() {
    let config = TempDir::new().unwrap();
    byteforge(config.path(), config.path())
        .arg("create")
        .assert()
        .failure();
}

#[test]
#[serial]
fn test_create_project_with_yes() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "My Cool App", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully created project in My Cool App"))
        .stdout(predicate::str::contains("cd My Cool App"));

    let dir = work.path().join("My Cool App");
    assert_eq!(package_name(&dir), "my-cool-app");
    assert!(dir.join("tsconfig.base.json").exists());
    assert!(dir.join("vite.config.base.ts").exists());
    assert!(dir.join("eslint.config.js").exists());
    assert!(dir.join(".gitignore").exists());
    assert!(dir.join("apps").is_dir());
    assert!(dir.join("libs").is_dir());
}

#[test]
#[serial]
fn test_create_new_directory_defaults_to_yes_without_terminal() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "portal"])
        .assert()
        .success();

    assert_eq!(package_name(&work.path().join("portal")), "portal");
}

#[test]
#[serial]
fn test_non_empty_directory_cancelled_without_terminal() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let dir = work.path().join("portal");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("notes.md"), "keep").unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "portal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled."));

    assert_eq!(fs::read_to_string(dir.join("notes.md")).unwrap(), "keep");
    assert!(!dir.join("package.json").exists());
}

#[test]
#[serial]
fn test_create_in_current_directory_preserves_git() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let dir = work.path().join("Team Portal");
    fs::create_dir_all(dir.join(".git")).unwrap();
    fs::write(dir.join(".git/HEAD"), "ref: refs/heads/main").unwrap();
    fs::write(dir.join("old.txt"), "stale").unwrap();
    fs::create_dir_all(dir.join("node_modules/pkg")).unwrap();

    byteforge(&dir, config.path())
        .args(["create", ".", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Directory contents cleared."))
        .stdout(predicate::str::contains("current directory"));

    assert!(dir.join(".git/HEAD").exists());
    assert!(!dir.join("old.txt").exists());
    assert!(!dir.join("node_modules").exists());
    assert_eq!(package_name(&dir), "team-portal");
}

#[test]
#[serial]
fn test_create_app_outside_monorepo_fails() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    fs::write(work.path().join("readme.txt"), "plain").unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "app", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a monorepo"));

    let entries: Vec<_> = fs::read_dir(work.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
#[serial]
fn test_create_app_rejects_nested_name() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    fs::create_dir(work.path().join("apps")).unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "app", "../escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid app name"));
}

#[test]
#[serial]
fn test_existing_app_cancelled_without_terminal() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let app = work.path().join("apps/web");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("index.html"), "<html/>").unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "app", "web"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled."));

    assert_eq!(fs::read_to_string(app.join("index.html")).unwrap(), "<html/>");
}

#[test]
#[serial]
fn test_templates_override_from_config_file() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    let templates = config.path().join("my-templates");
    fs::create_dir_all(templates.join("project-base")).unwrap();
    fs::write(
        templates.join("project-base/package.json"),
        r#"{"name": "custom", "private": true}"#,
    )
    .unwrap();
    fs::write(templates.join("project-base/CUSTOM.md"), "custom").unwrap();
    fs::create_dir_all(config.path().join("byteforge")).unwrap();
    fs::write(
        config.path().join("byteforge/config.toml"),
        format!("templates_dir = {:?}\n", templates.display().to_string()),
    )
    .unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "custom-repo", "-y"])
        .assert()
        .success();

    let dir = work.path().join("custom-repo");
    assert!(dir.join("CUSTOM.md").exists());
    assert!(!dir.join("tsconfig.base.json").exists());
    assert_eq!(package_name(&dir), "custom-repo");
}

#[test]
#[serial]
fn test_missing_templates_override_is_fatal() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();

    byteforge(work.path(), config.path())
        .args(["create", "demo", "-y", "--templates"])
        .arg(config.path().join("absent"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create project"));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_install_failure_is_reported_once() {
    let work = TempDir::new().unwrap();
    let config = TempDir::new().unwrap();
    fs::create_dir(work.path().join("apps")).unwrap();
    fs::write(
        work.path().join("package.json"),
        r#"{"name": "acme", "workspaces": ["apps/*"]}"#,
    )
    .unwrap();

    // `true create vite ...` succeeds without writing apps/web, so every
    // install then fails to start in the missing directory.
    let output = byteforge(work.path(), config.path())
        .args(["create", "app", "web", "--package-manager", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully created app \"web\""))
        .get_output()
        .clone();

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.matches("Failed to start `true add react-router").count(), 1);
    assert_eq!(stderr.matches("Failed to start `true add -D @types/react-router").count(), 1);
    assert!(stderr.contains("You can install them manually later with"));
}
