use anyhow::{bail, Context, Result};
use include_dir::{include_dir, Dir, DirEntry};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Template trees compiled into the binary.
///
/// `templates/project-base` seeds a new monorepo, `templates/react-app`
/// holds the Vite config and `src/` tree dropped into every new app.
static BUNDLED: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Monorepo skeleton copied by `create <project>`.
pub const PROJECT_BASE: &str = "project-base";
/// App Vite config replacing the one generated by `create vite`.
pub const REACT_APP_VITE_CONFIG: &str = "react-app/vite.config.ts";
/// App source tree replacing the generated `src/`.
pub const REACT_APP_SRC: &str = "react-app/src";

/// Where template content is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Templates {
    /// Trees embedded at compile time.
    Bundled,
    /// A directory on disk with the same layout as `templates/`.
    Directory(PathBuf),
}

impl Templates {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        match override_dir {
            Some(dir) => Templates::Directory(dir),
            None => Templates::Bundled,
        }
    }

    /// Whether `rel` (a `/`-separated path below the template root) exists.
    pub fn exists(&self, rel: &str) -> bool {
        match self {
            Templates::Bundled => BUNDLED.get_entry(rel).is_some(),
            Templates::Directory(root) => root.join(rel).exists(),
        }
    }

    /// Recursively copy the template directory `rel` into `dest`.
    ///
    /// Existing files in `dest` are overwritten, unrelated files are left in
    /// place. Returns the number of files written.
    pub fn copy_tree(&self, rel: &str, dest: &Path) -> Result<usize> {
        fs::create_dir_all(dest)
            .with_context(|| format!("Failed to create directory {:?}", dest))?;

        match self {
            Templates::Bundled => {
                let dir = BUNDLED
                    .get_dir(rel)
                    .with_context(|| format!("Bundled template '{rel}' not found"))?;
                copy_embedded(dir, Path::new(rel), dest)
            }
            Templates::Directory(root) => copy_from_disk(&root.join(rel), dest),
        }
    }

    /// Copy the single template file `rel` to `dest`, replacing it.
    pub fn copy_file(&self, rel: &str, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        match self {
            Templates::Bundled => {
                let file = BUNDLED
                    .get_file(rel)
                    .with_context(|| format!("Bundled template '{rel}' not found"))?;
                fs::write(dest, file.contents())
                    .with_context(|| format!("Failed to write {:?}", dest))?;
            }
            Templates::Directory(root) => {
                let source = root.join(rel);
                fs::copy(&source, dest)
                    .with_context(|| format!("Failed to copy {:?} to {:?}", source, dest))?;
            }
        }

        Ok(())
    }
}

fn copy_embedded(dir: &Dir<'_>, prefix: &Path, dest: &Path) -> Result<usize> {
    let mut written = 0;
    let mut pending = vec![dir];

    while let Some(current) = pending.pop() {
        for entry in current.entries() {
            let relative = entry
                .path()
                .strip_prefix(prefix)
                .with_context(|| format!("Template entry {:?} outside {:?}", entry.path(), prefix))?;
            let target = dest.join(relative);

            match entry {
                DirEntry::Dir(sub) => {
                    fs::create_dir_all(&target)
                        .with_context(|| format!("Failed to create directory {:?}", target))?;
                    pending.push(sub);
                }
                DirEntry::File(file) => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create directory {:?}", parent)
                        })?;
                    }
                    fs::write(&target, file.contents())
                        .with_context(|| format!("Failed to write {:?}", target))?;
                    written += 1;
                }
            }
        }
    }

    Ok(written)
}

fn copy_from_disk(source: &Path, dest: &Path) -> Result<usize> {
    if !source.is_dir() {
        bail!("Template directory {:?} not found", source);
    }

    let mut written = 0;
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read template {:?}", source))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Template entry {:?} outside {:?}", entry.path(), source))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {:?}", target))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?} to {:?}", entry.path(), target))?;
            written += 1;
        }
    }

    Ok(written)
}
