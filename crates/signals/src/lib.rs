//! Spot history and momentum signal detection.

pub mod detector;
pub mod history;

pub use detector::SignalDetector;
pub use history::PriceHistory;
