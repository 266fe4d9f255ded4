use crate::domain::entities::journal::Journal;
use crate::domain::entities::trade_signal::TradeSignal;
use crate::domain::error::StoreError;

/// Durable, day-segmented append log of trade signals.
///
/// Implementations serialize all mutation: concurrent `append` calls must not
/// lose updates, and readers never observe a partially written journal.
pub trait JournalStore: Send + Sync {
    /// Create an empty journal if none exists. Idempotent.
    fn initialize(&self) -> Result<(), StoreError>;

    /// Append `signal` to the day session matching its timestamp.
    fn append(&self, signal: TradeSignal) -> Result<(), StoreError>;

    /// Read the current journal.
    fn load(&self) -> Result<Journal, StoreError>;
}
