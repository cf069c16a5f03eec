use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// `extends` target for configs living in `apps/<name>/` or `libs/<name>/`.
pub const BASE_CONFIG_FROM_PACKAGE: &str = "../../tsconfig.base.json";

/// The `tsconfig.json` written into every new app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageTsConfig {
    pub compiler_options: OutputOptions,
    pub extends: String,
    pub include: Vec<String>,
    pub references: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub out_dir: String,
}

impl PackageTsConfig {
    pub fn extending_base() -> Self {
        Self {
            compiler_options: OutputOptions {
                out_dir: "./dist".to_string(),
            },
            extends: BASE_CONFIG_FROM_PACKAGE.to_string(),
            include: vec!["src/**/*".to_string(), "src/**/*.tsx".to_string()],
            references: Vec::new(),
        }
    }
}

/// A secondary config such as `tsconfig.app.json`; only `extends` is touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryTsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl SecondaryTsConfig {
    /// Parse JSON-with-comments as `tsc` accepts it.
    pub fn parse(source: &str) -> Result<Self> {
        let cleaned = strip_trailing_commas(&strip_comments(source));
        serde_json::from_str(&cleaned).context("Failed to parse tsconfig")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::parse(&source).with_context(|| format!("Invalid tsconfig {:?}", path))
    }
}

/// The monorepo-wide `tsconfig.base.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseTsConfig {
    #[serde(default)]
    pub compiler_options: BaseCompilerOptions,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// `compilerOptions` kept as an ordered map so `paths` and every other key
/// stay where the user put them.
pub type BaseCompilerOptions = Map<String, Value>;

impl BaseTsConfig {
    /// Map `alias` and `alias/*` onto `target` and `target/*`.
    ///
    /// New aliases are appended after the existing ones; an alias that is
    /// already mapped is updated in place. A missing or non-object `paths`
    /// is replaced by a fresh one.
    pub fn set_path_alias(&mut self, alias: &str, target: &str) {
        let paths = self
            .compiler_options
            .entry("paths")
            .or_insert_with(|| Value::Object(Map::new()));
        if !paths.is_object() {
            *paths = Value::Object(Map::new());
        }
        if let Value::Object(paths) = paths {
            paths.insert(alias.to_string(), Value::from(vec![target.to_string()]));
            paths.insert(format!("{alias}/*"), Value::from(vec![format!("{target}/*")]));
        }
    }

    /// Aliases mapped in `compilerOptions.paths`, in file order.
    pub fn path_aliases(&self) -> Vec<&str> {
        self.compiler_options
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| paths.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Remove `//` and `/* */` comments outside string literals.
///
/// Newlines inside comments are kept so parse errors still point at the
/// right line.
pub fn strip_comments(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Str,
        StrEscape,
        Line,
        Block,
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Code => match ch {
                '"' => {
                    state = State::Str;
                    out.push(ch);
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::Block;
                }
                _ => out.push(ch),
            },
            State::Str => {
                out.push(ch);
                match ch {
                    '\\' => state = State::StrEscape,
                    '"' => state = State::Code,
                    _ => {}
                }
            }
            State::StrEscape => {
                out.push(ch);
                state = State::Str;
            }
            State::Line => {
                if ch == '\n' {
                    out.push(ch);
                    state = State::Code;
                }
            }
            State::Block => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = State::Code;
                } else if ch == '\n' {
                    out.push(ch);
                }
            }
        }
    }

    out
}

/// Drop commas directly followed (ignoring whitespace) by `}` or `]`.
pub fn strip_trailing_commas(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut in_string = false;
    let mut escaped = false;

    for (idx, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = chars[idx + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}
