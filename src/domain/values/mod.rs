pub mod clock;
pub mod ticker;
pub mod trade_direction;
pub mod trade_magnitude;
