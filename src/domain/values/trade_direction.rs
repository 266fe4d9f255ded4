use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a classified trade: `good` for buying/bullish activity,
/// `bad` for selling/bearish activity.
///
/// Deserialization is exact: only the lowercase strings `"good"` and `"bad"`
/// are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Good,
    Bad,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Good => write!(f, "good"),
            TradeDirection::Bad => write!(f, "bad"),
        }
    }
}

impl FromStr for TradeDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(TradeDirection::Good),
            "bad" => Ok(TradeDirection::Bad),
            _ => Err(format!("Unknown trade direction: {s}")),
        }
    }
}
