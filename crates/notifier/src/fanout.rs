use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scalper_core::{LifecycleEvent, NotificationSink};

/// Delivers every event to each inner sink in order.
///
/// A failing sink does not stop delivery to the rest; the first error is
/// returned once all sinks have been tried.
#[derive(Default, Clone)]
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl NotificationSink for FanoutNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<()> {
        let mut failures = Vec::new();
        for sink in &self.sinks {
            if let Err(e) = sink.notify(event).await {
                failures.push(e.to_string());
            }
        }

        match failures.len() {
            0 => Ok(()),
            1 => Err(anyhow!("{}", failures[0])),
            n => Err(anyhow!("{n} sinks failed: {}", failures.join("; "))),
        }
    }
}
