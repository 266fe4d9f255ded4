pub mod journal;
pub mod post;
pub mod trade_signal;
