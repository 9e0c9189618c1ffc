use crate::cli::InitArgs;
use std::path::Path;

const TEMPLATE: &str = r#"version = "1"

# Files holding CREATE TABLE statements, relative to this file.
schema = ["db/*.sql"]

# Query manifests: [[query]] tables with name, kind, table, select, where, ...
queries = ["queries/*.toml"]

# Tables with this column only return rows where it IS NULL.
soft_delete_column = "is_deleted"

# Columns that should lead a WHERE clause.
index_hints = ["project_id"]

# Fail `check` and `gen` on advisories too.
deny_warnings = false

[gen]
out = "src/queries_gen.rs"
"#;

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    write_template(&args.config)
}

fn write_template(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        anyhow::bail!("refusing to overwrite existing file: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
            })?;
        }
    }

    std::fs::write(path, TEMPLATE)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
