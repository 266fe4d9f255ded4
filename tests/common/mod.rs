//! Shared test helpers: in-memory post sources and classifiers.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tradejournal::domain::entities::post::PostRecord;
use tradejournal::domain::entities::trade_signal::TradeSignal;
use tradejournal::domain::error::{ClassifierError, SourceError};
use tradejournal::domain::ports::classifier::Classifier;
use tradejournal::domain::ports::post_source::PostSource;
use tradejournal::domain::values::trade_direction::TradeDirection;
use tradejournal::domain::values::trade_magnitude::TradeMagnitude;
use tradejournal::infrastructure::classifier::openai::parse_signal;

pub const FRIDAY: &str = "Friday, October 16, 2026 09:30:12 AM EDT";
pub const MONDAY: &str = "Monday, October 19, 2026 10:01:00 AM EDT";

pub fn signal(company: &str, timestamp: &str) -> TradeSignal {
    TradeSignal {
        member_name: "Rep. Example".into(),
        company_traded: company.into(),
        trade_direction: TradeDirection::Good,
        trade_magnitude: TradeMagnitude::new(6).unwrap(),
        tweet_text: format!("Bought {company}"),
        timestamp: timestamp.into(),
    }
}

/// Post source answering from a fixed table. Unknown ids fail with
/// `NotFound`; ids in `delays` sleep before answering.
#[derive(Default)]
pub struct StaticSource {
    posts: HashMap<String, Vec<PostRecord>>,
    failing: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(mut self, id: &str, texts: &[&str]) -> Self {
        self.posts.insert(
            id.to_string(),
            texts.iter().map(|t| PostRecord::new(id, *t)).collect(),
        );
        self
    }

    pub fn failing(mut self, id: &str, error: &str) -> Self {
        self.failing.insert(id.to_string(), error.to_string());
        self
    }

    pub fn delayed(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_posts(&self, source_id: &str) -> Result<Vec<PostRecord>, SourceError> {
        self.calls.lock().unwrap().push(source_id.to_string());
        if let Some(delay) = self.delays.get(source_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.failing.get(source_id) {
            return Err(SourceError::Network(error.clone()));
        }
        self.posts
            .get(source_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(source_id.to_string()))
    }
}

/// Classifier that feeds a canned model reply through the real reply parser.
/// The reply for a post is looked up by exact post text; otherwise a valid
/// signal naming the first cashtag is produced.
pub struct ScriptedClassifier {
    replies: HashMap<String, String>,
    timestamp: String,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(timestamp: &str) -> Self {
        Self {
            replies: HashMap::new(),
            timestamp: timestamp.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reply(mut self, post_text: &str, reply: &str) -> Self {
        self.replies.insert(post_text.to_string(), reply.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, author: &str, text: &str) -> Result<Option<TradeSignal>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("OUTAGE") {
            return Err(ClassifierError::Transport("connection reset".into()));
        }
        let reply = match self.replies.get(text) {
            Some(reply) => reply.clone(),
            None => {
                let company = tradejournal::domain::values::ticker::extract_tickers(text)
                    .into_iter()
                    .next()
                    .map(|t| format!("${t}"))
                    .unwrap_or_default();
                serde_json::json!({
                    "member_name": author,
                    "company_traded": company,
                    "trade_direction": "good",
                    "trade_magnitude": 5,
                })
                .to_string()
            }
        };
        parse_signal(&reply, text, self.timestamp.clone())
    }
}
