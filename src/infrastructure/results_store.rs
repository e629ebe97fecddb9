// Bootstrap results file
use crate::domain::tenant::BootstrapResults;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

/// Replaces the file at `path` in one step so a crash never leaves it half written.
pub fn write_results(path: &Path, results: &BootstrapResults) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut file, results).context("failed to serialize bootstrap results")?;
    file.write_all(b"\n")?;
    file.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

/// Missing file reads as empty results
pub fn read_results(path: &Path) -> anyhow::Result<BootstrapResults> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BootstrapResults::new()),
        Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
    };
    serde_json::from_str(&contents).with_context(|| format!("{} is not a bootstrap results file", path.display()))
}
