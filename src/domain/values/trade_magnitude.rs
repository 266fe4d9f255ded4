use serde::{Deserialize, Serialize};
use std::fmt;

/// Conviction/size of a trade on a 1–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TradeMagnitude(u8);

impl TradeMagnitude {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self, String> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(format!(
                "Trade magnitude must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            ));
        }
        Ok(TradeMagnitude(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TradeMagnitude {
    type Error = String;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TradeMagnitude::new(value)
    }
}

impl From<TradeMagnitude> for u8 {
    fn from(m: TradeMagnitude) -> Self {
        m.0
    }
}

impl fmt::Display for TradeMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
