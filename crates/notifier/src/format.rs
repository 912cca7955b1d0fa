//! HTML message bodies for chat delivery.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use scalper_core::{LifecycleEvent, Position};

/// Escapes text for Telegram's HTML parse mode.
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn money(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

fn signed(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", money(value))
    } else {
        money(value)
    }
}

/// Renders lifecycle events as short HTML messages.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    symbol: String,
    tz: Tz,
}

impl MessageFormatter {
    #[must_use]
    pub fn new(symbol: impl Into<String>, tz: Tz) -> Self {
        Self {
            symbol: symbol.into(),
            tz,
        }
    }

    fn time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format("%H:%M:%S").to_string()
    }

    #[must_use]
    pub fn format(&self, event: &LifecycleEvent) -> String {
        match event {
            LifecycleEvent::Opened {
                position,
                target_premium,
                stop_premium,
            } => self.opened(position, *target_premium, *stop_premium),
            LifecycleEvent::Closed {
                position,
                current_capital,
                daily_pnl,
            } => self.closed(position, *current_capital, *daily_pnl),
            LifecycleEvent::Skipped {
                direction,
                spot,
                reason,
                timestamp,
            } => format!(
                "⚠️ <b>{} {direction} SKIPPED</b>\n\n\
                 Spot: <code>{}</code>\n\
                 Reason: {}\n\
                 Time: <code>{}</code>",
                escape_html(&self.symbol),
                money(*spot),
                escape_html(reason),
                self.time(*timestamp),
            ),
        }
    }

    fn opened(&self, position: &Position, target: Decimal, stop: Decimal) -> String {
        format!(
            "🟢 <b>{} {} ENTRY</b> #{}\n\n\
             Contract: <code>{}</code>\n\
             Spot: <code>{}</code>\n\
             Premium: <code>{}</code>\n\
             Qty: <code>{}</code> ({} lot)\n\
             Investment: <code>{}</code>\n\n\
             Target: <code>{}</code>\n\
             SL: <code>{}</code>\n\
             Time: <code>{}</code>",
            escape_html(&self.symbol),
            position.direction,
            position.id,
            position.contract_label(),
            money(position.spot_at_entry),
            money(position.entry_premium),
            position.quantity,
            position.lots,
            money(position.investment),
            money(target),
            money(stop),
            self.time(position.entry_time),
        )
    }

    fn closed(&self, position: &Position, capital: Decimal, daily_pnl: Decimal) -> String {
        let pnl = position.realized_pnl.unwrap_or_default();
        let icon = if pnl > Decimal::ZERO { "✅" } else { "🔴" };
        let reason = position
            .exit_reason
            .map_or_else(|| "UNKNOWN".to_string(), |r| r.to_string());

        format!(
            "{icon} <b>{} EXIT {reason}</b> #{}\n\n\
             Contract: <code>{}</code>\n\
             Entry: <code>{}</code> → Exit: <code>{}</code>\n\
             P&amp;L: <code>{}</code>\n\n\
             Capital: <code>{}</code>\n\
             Today: <code>{}</code>",
            escape_html(&self.symbol),
            position.id,
            position.contract_label(),
            money(position.entry_premium),
            money(position.exit_premium.unwrap_or_default()),
            signed(pnl),
            money(capital),
            signed(daily_pnl),
        )
    }
}
