use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub dry_run: bool,
    pub check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Unchanged,
    WouldWrite,
    Written,
}

/// Write `content` to `path` unless it is already up to date.
///
/// `dry_run` only reports, `check` fails when the file is out of date.
pub fn apply_generated_file(
    path: &Path,
    content: &str,
    opts: WriteOptions,
) -> anyhow::Result<WriteOutcome> {
    let existing = std::fs::read_to_string(path).ok();
    if existing.as_deref() == Some(content) {
        return Ok(WriteOutcome::Unchanged);
    }

    if opts.dry_run {
        println!("would write {}", path.display());
        return Ok(WriteOutcome::WouldWrite);
    }

    if opts.check {
        anyhow::bail!("generated file is out of date: {}", path.display());
    }

    write_atomic(path, content)?;
    println!("wrote {}", path.display());
    Ok(WriteOutcome::Written)
}

fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
            })?;
        }
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, content)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", tmp.display()))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        anyhow::anyhow!(
            "failed to rename {} -> {}: {e}",
            tmp.display(),
            path.display()
        )
    })?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{ext}.tmp")),
        None => path.with_extension("tmp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pgclause-cli-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn write_then_unchanged_then_check() {
        let dir = scratch_dir("write");
        let path = dir.join("nested/queries_gen.rs");
        let write = WriteOptions {
            dry_run: false,
            check: false,
        };

        assert_eq!(
            apply_generated_file(&path, "a", write).unwrap(),
            WriteOutcome::Written
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");
        assert!(!tmp_path(&path).exists());
        assert_eq!(
            apply_generated_file(&path, "a", write).unwrap(),
            WriteOutcome::Unchanged
        );

        let check = WriteOptions {
            dry_run: false,
            check: true,
        };
        assert!(apply_generated_file(&path, "b", check).is_err());

        let dry_run = WriteOptions {
            dry_run: true,
            check: false,
        };
        assert_eq!(
            apply_generated_file(&path, "b", dry_run).unwrap(),
            WriteOutcome::WouldWrite
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn tmp_path_keeps_extension() {
        assert_eq!(tmp_path(Path::new("a/b.rs")), PathBuf::from("a/b.rs.tmp"));
        assert_eq!(tmp_path(Path::new("a/b")), PathBuf::from("a/b.tmp"));
    }
}
