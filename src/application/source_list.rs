use crate::domain::error::RunError;
use std::collections::HashSet;
use std::path::PathBuf;

/// Newline-delimited list of source ids, re-read on every run so sources can
/// be added or removed while the supervisor is running.
#[derive(Debug, Clone)]
pub struct SourceList {
    path: PathBuf,
}

impl SourceList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the current ids. Blank lines are ignored; an empty list is a
    /// run-level error.
    pub async fn load(&self) -> Result<Vec<String>, RunError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RunError::SourceList {
                path: self.path.display().to_string(),
                source,
            })?;
        let ids = parse_source_ids(&raw);
        if ids.is_empty() {
            return Err(RunError::NoSources(self.path.display().to_string()));
        }
        Ok(ids)
    }
}

/// Trimmed, non-blank ids in file order. Repeated ids are kept once.
pub fn parse_source_ids(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && seen.insert(*l))
        .map(String::from)
        .collect()
}
