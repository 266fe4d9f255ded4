use crate::domain::values::trade_direction::TradeDirection;
use crate::domain::values::trade_magnitude::TradeMagnitude;
use serde::{Deserialize, Serialize};

/// A classified trading signal extracted from one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub member_name: String,
    pub company_traded: String,
    pub trade_direction: TradeDirection,
    pub trade_magnitude: TradeMagnitude,
    pub tweet_text: String,
    /// Reference-timezone timestamp, see [`crate::domain::values::clock::TIMESTAMP_FORMAT`].
    pub timestamp: String,
}
