use crate::domain::entities::post::PostRecord;
use crate::domain::error::SourceError;
use crate::domain::ports::post_source::PostSource;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Replays posts captured to disk, one file per source id.
///
/// `{dir}/{id}.json` holds an array of `{"author", "text"}` objects;
/// otherwise `{dir}/{id}.txt` holds one post per line, attributed to `id`.
pub struct DirectoryPostSource {
    dir: PathBuf,
}

impl DirectoryPostSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PostSource for DirectoryPostSource {
    fn name(&self) -> &str {
        "directory"
    }

    async fn fetch_posts(&self, source_id: &str) -> Result<Vec<PostRecord>, SourceError> {
        let stem = source_id.trim_start_matches('@');
        if stem.is_empty() || stem.contains(['/', '\\']) || stem.starts_with('.') {
            return Err(SourceError::NotFound(source_id.to_string()));
        }

        match tokio::fs::read(self.dir.join(format!("{stem}.json"))).await {
            Ok(bytes) => return serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(SourceError::Network(e.to_string())),
        }

        match tokio::fs::read_to_string(self.dir.join(format!("{stem}.txt"))).await {
            Ok(raw) => Ok(raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| PostRecord::new(source_id, l))
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SourceError::NotFound(source_id.to_string())),
            Err(e) => Err(SourceError::Network(e.to_string())),
        }
    }
}
