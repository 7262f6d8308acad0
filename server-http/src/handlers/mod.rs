mod health;
mod market;

pub use health::health_check;
pub use market::{market_summary, UNAVAILABLE_BODY};
