use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a top-level entry survives a directory reset.
///
/// Anything starting with `.git` (the repository itself, `.github`,
/// `.gitattributes`, ...) and a literal `.gitignore` are kept.
pub fn is_preserved(name: &str) -> bool {
    name.starts_with(".git") || name == ".gitignore"
}

/// Top-level entries of `dir`, sorted by name.
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?
    {
        let entry = entry.with_context(|| format!("Failed to read directory {:?}", dir))?;
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Top-level entries of `dir` that a reset would delete.
pub fn removable_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_entries(dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .map(|name| !is_preserved(&name.to_string_lossy()))
                .unwrap_or(false)
        })
        .collect())
}

/// Whether `dir` exists and has at least one entry.
pub fn is_non_empty_dir(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;
    Ok(entries.next().is_some())
}

/// Remove the given paths concurrently, one spawned task per path, and wait
/// for all of them.
///
/// The first failure is returned after every task has finished.
pub async fn remove_all(paths: Vec<PathBuf>) -> Result<usize> {
    let mut tasks = Vec::with_capacity(paths.len());
    for path in paths {
        tasks.push(tokio::spawn(async move {
            let metadata = tokio::fs::symlink_metadata(&path)
                .await
                .with_context(|| format!("Failed to inspect {:?}", path))?;
            let result = if metadata.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            result.with_context(|| format!("Failed to remove {:?}", path))?;
            tracing::debug!(path = %path.display(), "removed");
            Ok::<_, anyhow::Error>(())
        }));
    }

    let mut removed = 0;
    let mut first_error = None;
    for task in tasks {
        match task.await.context("Removal task panicked").and_then(|result| result) {
            Ok(()) => removed += 1,
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(removed),
    }
}

/// Delete every non-git top-level entry of `dir`; `dir` itself stays.
pub async fn clear_directory(dir: &Path) -> Result<usize> {
    let entries = removable_entries(dir)?;
    remove_all(entries).await
}
