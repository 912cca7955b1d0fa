pub mod config;
pub mod config_loader;
pub mod error;
pub mod events;
pub mod market_hours;
pub mod position;
pub mod traits;

pub use config::{
    AppConfig, CapitalConfig, DailyResetPolicy, ExitConfig, FeedConfig, FeedKind,
    InstrumentConfig, PremiumTier, RiskConfig, ScheduleConfig, SignalConfig, StrikeConfig,
    TelegramConfig,
};
pub use config_loader::ConfigLoader;
pub use error::FeedError;
pub use events::{Direction, LifecycleEvent, PriceSample, Signal, SignalOrigin, SignalStrength};
pub use market_hours::MarketHours;
pub use position::{ExitReason, Position, PositionId, PositionStatus};
pub use traits::{NotificationSink, PriceSource};
