#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Asia::Kolkata;
use rust_decimal::Decimal;
use scalper_core::{AppConfig, FeedError, LifecycleEvent, NotificationSink, PriceSource};
use scalper_options_manager::TradingCycle;

/// Price source that replays a fixed script, then times out.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Result<Decimal, FeedError>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn push(&self, price: Decimal) {
        self.script.lock().unwrap().push_back(Ok(price));
    }

    pub fn push_err(&self, err: FeedError) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn spot_price(&self) -> Result<Decimal, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FeedError::Timeout))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(LifecycleEvent::kind).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, event: &LifecycleEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn notify(&self, _event: &LifecycleEvent) -> anyhow::Result<()> {
        anyhow::bail!("chat service unreachable")
    }
}

/// Monday 2025-01-06 at `hh:mm` exchange time.
pub fn ist(hour: u32, minute: u32) -> DateTime<Utc> {
    ist_on(6, hour, minute)
}

pub fn ist_on(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Kolkata
        .with_ymd_and_hms(2025, 1, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

pub struct Harness {
    pub cycle: TradingCycle,
    pub source: ScriptedSource,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(config: &AppConfig) -> Harness {
    let source = ScriptedSource::default();
    let sink = Arc::new(RecordingSink::default());
    let cycle = TradingCycle::new(config, Box::new(source.clone()), sink.clone()).unwrap();
    Harness { cycle, source, sink }
}
