use crate::domain::entities::trade_signal::TradeSignal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-day bucket of signals, in append order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySession {
    /// `YYYY-MM-DD` in the reference timezone.
    pub date: NaiveDate,
    pub market_open_time: String,
    pub analyses: Vec<TradeSignal>,
}

/// The whole persisted state: at most one [`DaySession`] per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub trading_sessions: Vec<DaySession>,
}

impl Journal {
    pub fn session(&self, date: NaiveDate) -> Option<&DaySession> {
        self.trading_sessions.iter().find(|s| s.date == date)
    }

    /// Append `signal` to the session for `date`, creating the session (stamped
    /// with `open_time`) if this is the first signal of that day.
    /// Returns true when a new session was created.
    pub fn record(&mut self, date: NaiveDate, signal: TradeSignal, open_time: impl FnOnce() -> String) -> bool {
        match self.trading_sessions.iter_mut().find(|s| s.date == date) {
            Some(session) => {
                session.analyses.push(signal);
                false
            }
            None => {
                self.trading_sessions.push(DaySession {
                    date,
                    market_open_time: open_time(),
                    analyses: vec![signal],
                });
                true
            }
        }
    }

    pub fn total_analyses(&self) -> usize {
        self.trading_sessions.iter().map(|s| s.analyses.len()).sum()
    }
}
