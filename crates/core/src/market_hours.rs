//! Exchange trading-window calendar.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::ScheduleConfig;

/// Fixed daily trading window, Monday to Friday, in the exchange's zone.
#[derive(Debug, Clone, Copy)]
pub struct MarketHours {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
}

impl MarketHours {
    #[must_use]
    pub const fn new(tz: Tz, open: NaiveTime, close: NaiveTime) -> Self {
        Self { tz, open, close }
    }

    /// Builds the calendar from the schedule section of the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone or either time of day fails to parse.
    pub fn from_config(config: &ScheduleConfig) -> anyhow::Result<Self> {
        let tz: Tz = config
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {e}", config.timezone))?;
        let open = NaiveTime::parse_from_str(&config.market_open, "%H:%M")?;
        let close = NaiveTime::parse_from_str(&config.market_close, "%H:%M")?;
        Ok(Self::new(tz, open, close))
    }

    /// True iff `now` falls on a weekday inside `[open, close]` local time.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let t = local.time();
        t >= self.open && t <= self.close
    }

    /// Exchange-local calendar date of `now`.
    #[must_use]
    pub fn trading_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for MarketHours {
    fn default() -> Self {
        Self::new(
            chrono_tz::Asia::Kolkata,
            NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
        )
    }
}
