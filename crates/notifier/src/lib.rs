//! Notification sinks for position lifecycle events.

pub mod fanout;
pub mod format;
pub mod log_sink;
pub mod telegram;

pub use fanout::FanoutNotifier;
pub use format::MessageFormatter;
pub use log_sink::LogNotifier;
pub use telegram::{TelegramNotifier, TELEGRAM_API_URL};
