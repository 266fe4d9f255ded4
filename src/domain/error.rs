use thiserror::Error;

/// Retrieval failure for a single source. Recorded and skipped.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out fetching {0}")]
    Timeout(String),

    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Transport or parse failure for a single post. Treated as "no signal".
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier transport error: {0}")]
    Transport(String),

    #[error("Classifier service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Malformed classifier response: {0}")]
    Parse(String),
}

/// Persistence failure for a single append. Logged and the signal is dropped.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Journal decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unreadable signal timestamp: {0}")]
    Timestamp(String),

    #[error("Journal lock poisoned")]
    Poisoned,
}

/// Run-level failure. Advances the supervisor's consecutive-failure counter.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Cannot read source list {path}: {source}")]
    SourceList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No source ids found in {0}")]
    NoSources(String),

    #[error("Journal unavailable: {0}")]
    Journal(#[from] StoreError),

    #[error("All {failed} sources failed")]
    AllSourcesFailed { failed: usize },
}

/// Missing or invalid required configuration. Aborts startup.
#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct FatalConfigError(pub String);

impl From<String> for FatalConfigError {
    fn from(s: String) -> Self {
        FatalConfigError(s)
    }
}

impl From<&str> for FatalConfigError {
    fn from(s: &str) -> Self {
        FatalConfigError(s.to_string())
    }
}
