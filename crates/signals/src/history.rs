//! Bounded rolling buffer of recent spot samples.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use scalper_core::PriceSample;

/// Fixed-capacity FIFO of spot samples, oldest first.
///
/// Length never exceeds the capacity and timestamps never go backwards.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl PriceHistory {
    /// Creates an empty history. Capacities below 3 are raised to 3 so the
    /// detector always has a full window to work with.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(3);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest when full.
    ///
    /// Returns `false` (and leaves the buffer untouched) if the sample is
    /// older than the newest one already held.
    pub fn append(&mut self, sample: PriceSample) -> bool {
        if let Some(last) = self.samples.back() {
            if sample.timestamp < last.timestamp {
                tracing::warn!(
                    newest = %last.timestamp,
                    rejected = %sample.timestamp,
                    "Out-of-order price sample dropped"
                );
                return false;
            }
        }

        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        true
    }

    /// Convenience wrapper around [`PriceHistory::append`].
    pub fn record(&mut self, timestamp: DateTime<Utc>, price: Decimal) -> bool {
        self.append(PriceSample::new(timestamp, price))
    }

    /// The `n` most recent samples, oldest first. `None` if fewer are held.
    #[must_use]
    pub fn last_n(&self, n: usize) -> Option<Vec<PriceSample>> {
        if self.samples.len() < n {
            return None;
        }
        Some(self.samples.iter().skip(self.samples.len() - n).copied().collect())
    }

    #[must_use]
    pub fn latest(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    #[must_use]
    pub fn latest_price(&self) -> Option<Decimal> {
        self.samples.back().map(|s| s.price)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSample> {
        self.samples.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
