use crate::domain::entities::post::PostRecord;
use crate::domain::error::SourceError;
use crate::domain::ports::post_source::PostSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Post source backed by an HTTP endpoint that renders an account's timeline
/// as JSON (e.g. a headless-browser scraping sidecar).
///
/// `GET {base_url}/{source_id}` must return either a bare array of
/// `{"author", "text"}` objects or an object with a `posts` array.
pub struct HttpPostSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPostSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .user_agent(concat!("tradejournal/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    fn url_for(&self, source_id: &str) -> String {
        format!("{}/{}", self.base_url, source_id.trim_start_matches('@'))
    }
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum TimelineResponse {
    Bare(Vec<TimelinePost>),
    Wrapped { posts: Vec<TimelinePost> },
}

#[derive(Debug, serde::Deserialize)]
struct TimelinePost {
    #[serde(default)]
    author: Option<String>,
    text: String,
}

#[async_trait]
impl PostSource for HttpPostSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_posts(&self, source_id: &str) -> Result<Vec<PostRecord>, SourceError> {
        let resp = self
            .client
            .get(self.url_for(source_id))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(source_id.to_string())
                } else {
                    SourceError::Network(e.to_string())
                }
            })?;

        match resp.status() {
            s if s.is_success() => {}
            s if s == StatusCode::NOT_FOUND => return Err(SourceError::NotFound(source_id.to_string())),
            s => return Err(SourceError::Network(format!("timeline endpoint returned {s}"))),
        }

        let data: TimelineResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        let posts = match data {
            TimelineResponse::Bare(posts) | TimelineResponse::Wrapped { posts } => posts,
        };

        Ok(posts
            .into_iter()
            .map(|p| PostRecord::new(p.author.unwrap_or_else(|| source_id.to_string()), p.text))
            .collect())
    }
}
