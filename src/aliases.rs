//! Path alias registration in the monorepo-wide configs.
//!
//! Every package gets `@<name>` (and `@<name>/*`) in `tsconfig.base.json`,
//! and its name appended to the `apps`/`libs` string array declared in
//! `vite.config.base.ts`, which builds the bundler aliases from that list.

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

use crate::manifest::{read_json, write_json};
use crate::tsconfig::BaseTsConfig;

pub const TSCONFIG_BASE: &str = "tsconfig.base.json";
pub const VITE_CONFIG_BASE: &str = "vite.config.base.ts";

/// Which top-level folder a package lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Apps,
    Libs,
}

impl AliasKind {
    pub fn dir(self) -> &'static str {
        match self {
            AliasKind::Apps => "apps",
            AliasKind::Libs => "libs",
        }
    }
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}

#[derive(Debug, Error)]
pub enum AliasArrayError {
    #[error("unterminated `{kind}` array literal")]
    Unterminated { kind: AliasKind },
    #[error("unexpected `{found}` at byte {offset} in `{kind}` array literal")]
    Unexpected {
        kind: AliasKind,
        found: char,
        offset: usize,
    },
    #[error("invalid declaration pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A `const <kind>: string[] = [...]` literal located in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasArray {
    kind: AliasKind,
    /// Byte range from the opening `[` through the closing `]`.
    span: Range<usize>,
    entries: Vec<String>,
}

impl AliasArray {
    /// Locate and parse the array for `kind`.
    ///
    /// `Ok(None)` means the declaration does not exist. Only string literals,
    /// commas and whitespace are accepted between the brackets.
    pub fn find(source: &str, kind: AliasKind) -> Result<Option<Self>, AliasArrayError> {
        let pattern = format!(r"const\s+{}\s*:\s*string\s*\[\s*\]\s*=\s*\[", kind.dir());
        let header = Regex::new(&pattern)?;

        let Some(found) = header.find(source) else {
            return Ok(None);
        };

        let open = found.end() - 1;
        let mut entries = Vec::new();
        let mut chars = source[found.end()..].char_indices();

        while let Some((rel, ch)) = chars.next() {
            let offset = found.end() + rel;
            match ch {
                ']' => {
                    return Ok(Some(Self {
                        kind,
                        span: open..offset + 1,
                        entries,
                    }));
                }
                ',' => {}
                c if c.is_whitespace() => {}
                '\'' | '"' | '`' => {
                    let quote = ch;
                    let mut value = String::new();
                    let mut closed = false;
                    while let Some((_, c)) = chars.next() {
                        match c {
                            '\\' => {
                                if let Some((_, escaped)) = chars.next() {
                                    value.push(escaped);
                                }
                            }
                            c if c == quote => {
                                closed = true;
                                break;
                            }
                            c => value.push(c),
                        }
                    }
                    if !closed {
                        return Err(AliasArrayError::Unterminated { kind });
                    }
                    let value = value.trim();
                    if !value.is_empty() {
                        entries.push(value.to_string());
                    }
                }
                other => {
                    return Err(AliasArrayError::Unexpected {
                        kind,
                        found: other,
                        offset,
                    });
                }
            }
        }

        Err(AliasArrayError::Unterminated { kind })
    }

    pub fn kind(&self) -> AliasKind {
        self.kind
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry == name)
    }

    /// Append `name` unless already listed; returns whether it was added.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(name.to_string());
        true
    }

    /// The array literal, e.g. `['web', 'admin']`.
    pub fn render(&self) -> String {
        let items: Vec<String> = self
            .entries
            .iter()
            .map(|entry| format!("'{}'", entry.replace('\\', "\\\\").replace('\'', "\\'")))
            .collect();
        format!("[{}]", items.join(", "))
    }

    /// `source` with this array's literal replaced by [`render`](Self::render).
    pub fn apply(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + 16);
        out.push_str(&source[..self.span.start]);
        out.push_str(&self.render());
        out.push_str(&source[self.span.end..]);
        out
    }
}

/// Result of registering a name in `vite.config.base.ts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViteAliasUpdate {
    Added,
    AlreadyPresent,
    NoConfigFile,
    NoDeclaration,
}

/// Add `@<name>` / `@<name>/*` to the `tsconfig.base.json` at `path`.
///
/// Returns `false` when the file does not exist.
pub fn register_ts_path(path: &Path, name: &str, kind: AliasKind) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let mut config: BaseTsConfig = read_json(path)?;
    config.set_path_alias(&format!("@{name}"), &format!("./{}/{name}/src", kind.dir()));
    write_json(path, &config)?;
    tracing::debug!(name, %kind, path = %path.display(), "registered ts path alias");
    Ok(true)
}

/// Append `name` to the `kind` array in the `vite.config.base.ts` at `path`.
///
/// The file is only rewritten when the name was actually added.
pub fn register_vite_alias(path: &Path, name: &str, kind: AliasKind) -> Result<ViteAliasUpdate> {
    if !path.exists() {
        return Ok(ViteAliasUpdate::NoConfigFile);
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let Some(mut array) = AliasArray::find(&source, kind)
        .with_context(|| format!("Failed to parse {:?}", path))?
    else {
        return Ok(ViteAliasUpdate::NoDeclaration);
    };

    if !array.insert(name) {
        return Ok(ViteAliasUpdate::AlreadyPresent);
    }

    fs::write(path, array.apply(&source))
        .with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!(name, %kind, path = %path.display(), "registered vite alias");
    Ok(ViteAliasUpdate::Added)
}
