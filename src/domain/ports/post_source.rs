use crate::domain::entities::post::PostRecord;
use crate::domain::error::SourceError;
use async_trait::async_trait;

/// Retrieves the recent posts of one source (e.g. one account).
///
/// Implementations own any session or connection they open for a fetch and
/// must release it themselves; callers may stop awaiting a fetch that runs
/// past the run deadline.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Human-readable name of this source backend.
    fn name(&self) -> &str;

    /// Fetch posts for `source_id`. An empty vec is a valid answer.
    async fn fetch_posts(&self, source_id: &str) -> Result<Vec<PostRecord>, SourceError>;
}
