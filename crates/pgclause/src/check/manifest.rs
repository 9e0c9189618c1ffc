use super::CheckError;
use crate::query::Query;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A clause description with the name it is checked and generated under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedQuery {
    pub name: String,
    /// Manifest file the query came from.
    pub source: Option<PathBuf>,
    pub query: Query,
}

impl NamedQuery {
    pub fn new(name: impl Into<String>, query: impl Into<Query>) -> Self {
        Self {
            name: name.into(),
            source: None,
            query: query.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    query: Vec<toml::Table>,
}

/// A TOML file of `[[query]]` tables.
///
/// ```toml
/// [[query]]
/// name = "list_actions"
/// kind = "select"
/// table = "actions"
/// select = ["actions.id", "actions.name"]
/// where = [{ field = "actions.project_id", op = "=", value = "?", args = ["0"] }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub queries: Vec<NamedQuery>,
}

impl Manifest {
    /// Parse manifest text. `source` is only used for error messages.
    pub fn from_toml(text: &str, source: Option<&Path>) -> Result<Self, CheckError> {
        let display = source
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<manifest>".to_string());

        let raw: RawManifest = toml::from_str(text).map_err(|e| CheckError::Parse {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let mut queries = Vec::with_capacity(raw.query.len());
        for (index, mut table) in raw.query.into_iter().enumerate() {
            let name = match table.remove("name") {
                Some(toml::Value::String(name)) if !name.trim().is_empty() => name,
                _ => {
                    return Err(CheckError::Entry {
                        path: display,
                        entry: format!("#{}", index + 1),
                        message: "missing string field `name`".to_string(),
                    });
                }
            };
            let query: Query = toml::Value::Table(table).try_into().map_err(
                |e: toml::de::Error| CheckError::Entry {
                    path: display.clone(),
                    entry: name.clone(),
                    message: e.to_string(),
                },
            )?;
            queries.push(NamedQuery {
                name,
                source: source.map(Path::to_path_buf),
                query,
            });
        }
        Ok(Self { queries })
    }

    /// Read and parse one manifest file.
    pub fn load(path: &Path) -> Result<Self, CheckError> {
        let text = std::fs::read_to_string(path).map_err(|e| CheckError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text, Some(path))
    }

    /// Load every manifest matched by `patterns` (relative to `base_dir`), in path order.
    pub fn load_all(base_dir: &Path, patterns: &[String]) -> Result<Self, CheckError> {
        let mut manifest = Self::default();
        for path in expand_globs(base_dir, patterns)? {
            manifest.queries.extend(Self::load(&path)?.queries);
        }
        Ok(manifest)
    }
}

/// Expand glob patterns relative to `base_dir` into a sorted, de-duplicated file
/// list. A pattern that matches no file is an error.
pub fn expand_globs(base_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, CheckError> {
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();

    for p in patterns {
        let abs = if Path::new(p).is_absolute() {
            PathBuf::from(p)
        } else {
            base_dir.join(p)
        };
        let pattern = abs.to_string_lossy().to_string();

        let entries = glob::glob(&pattern).map_err(|e| CheckError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut matched_any = false;
        for entry in entries {
            let path = entry.map_err(|e| CheckError::Glob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            if path.is_file() {
                matched_any = true;
                files.insert(path);
            }
        }

        if !matched_any {
            return Err(CheckError::NoMatch { pattern });
        }
    }

    Ok(files.into_iter().collect())
}
