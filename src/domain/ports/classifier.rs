use crate::domain::entities::trade_signal::TradeSignal;
use crate::domain::error::ClassifierError;
use async_trait::async_trait;

/// Turns a post into a trade signal.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// `Ok(None)` when the post carries no clear trading signal.
    async fn classify(&self, author: &str, text: &str) -> Result<Option<TradeSignal>, ClassifierError>;
}
