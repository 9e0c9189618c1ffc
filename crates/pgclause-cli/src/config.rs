use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;
        Self::from_toml(&raw, &config_path)
    }

    fn from_toml(raw: &str, config_path: &Path) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let mut file: ConfigFile = toml::from_str(raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to parse config file {}: {e}",
                config_path.display()
            )
        })?;

        file.expand_env()?;
        file.validate()?;

        Ok(Self { config_dir, file })
    }

    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.config_dir.join(p)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    /// Schema globs, relative to the config file.
    pub schema: Vec<String>,
    /// Query manifest globs, relative to the config file.
    pub queries: Vec<String>,

    #[serde(default)]
    pub soft_delete_column: Option<String>,
    #[serde(default)]
    pub index_hints: Option<Vec<String>>,
    #[serde(default)]
    pub deny_warnings: bool,

    #[serde(default, rename = "gen")]
    pub generate: Option<GenConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenConfig {
    pub out: String,
}

impl ConfigFile {
    fn expand_env(&mut self) -> anyhow::Result<()> {
        for p in self.schema.iter_mut().chain(self.queries.iter_mut()) {
            *p = expand_env_vars(p)?;
        }
        if let Some(column) = self.soft_delete_column.as_mut() {
            *column = expand_env_vars(column)?;
        }
        if let Some(generate) = self.generate.as_mut() {
            generate.out = expand_env_vars(&generate.out)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.schema.iter().all(|p| p.trim().is_empty()) {
            anyhow::bail!("schema must list at least one file or glob");
        }
        if self.queries.iter().all(|p| p.trim().is_empty()) {
            anyhow::bail!("queries must list at least one file or glob");
        }
        if let Some(column) = &self.soft_delete_column {
            if column.trim().is_empty() {
                anyhow::bail!("soft_delete_column must not be empty");
            }
        }
        if let Some(hints) = &self.index_hints {
            if hints.iter().any(|h| h.trim().is_empty()) {
                anyhow::bail!("index_hints must not contain empty names");
            }
        }
        if let Some(generate) = &self.generate {
            if generate.out.trim().is_empty() {
                anyhow::bail!("gen.out must not be empty");
            }
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            anyhow::bail!("unterminated env var reference: ${{{after}");
        };
        let key = &after[..end];
        if key.is_empty() {
            anyhow::bail!("invalid env var reference: ${{}}");
        }
        let v = std::env::var(key)
            .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
        out.push_str(&v);
        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_minimal_config() {
        let project = ProjectConfig::from_toml(
            r#"
version = "1"
schema = ["db/*.sql"]
queries = ["queries/*.toml"]

[gen]
out = "src/queries_gen.rs"
"#,
            Path::new("app/pgclause.toml"),
        )
        .unwrap();

        assert_eq!(project.config_dir, PathBuf::from("app"));
        assert_eq!(project.file.schema, vec!["db/*.sql"]);
        assert!(project.file.soft_delete_column.is_none());
        assert!(!project.file.deny_warnings);
        assert_eq!(
            project.resolve_path(&project.file.generate.as_ref().unwrap().out),
            PathBuf::from("app/src/queries_gen.rs")
        );
    }

    #[test]
    fn reject_invalid_config() {
        let path = Path::new("pgclause.toml");
        let err = ProjectConfig::from_toml(
            "version = \"2\"\nschema = [\"a.sql\"]\nqueries = [\"q.toml\"]\n",
            path,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported config version"));

        let err =
            ProjectConfig::from_toml("version = \"1\"\nschema = []\nqueries = [\"q.toml\"]\n", path)
                .unwrap_err();
        assert!(err.to_string().contains("schema must list"));

        let err = ProjectConfig::from_toml(
            "version = \"1\"\nschema = [\"a.sql\"]\nqueries = [\"q.toml\"]\nsoft_delete_column = \" \"\n",
            path,
        )
        .unwrap_err();
        assert!(err.to_string().contains("soft_delete_column"));
    }

    #[test]
    fn expand_env() {
        assert_eq!(expand_env_vars("plain").unwrap(), "plain");
        let path = std::env::var("PATH").unwrap();
        assert_eq!(expand_env_vars("x/${PATH}/y").unwrap(), format!("x/{path}/y"));
        assert!(expand_env_vars("${UNTERMINATED").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert!(expand_env_vars("${PGCLAUSE_SURELY_UNSET_VAR}").is_err());
    }
}
