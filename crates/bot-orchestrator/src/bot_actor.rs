use crate::bot_handle::BotHandle;
use crate::commands::{BotCommand, BotState, BotStatus};
use anyhow::Result;
use chrono::{DateTime, Utc};
use scalper_options_manager::TradingCycle;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Source of "now" for the trading cycle. Swappable so tests can pin the
/// market calendar.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Sole owner of the trading cycle and everything it holds.
///
/// Runs cycles on the cycle's own schedule and serves commands in between;
/// both happen on this one task, so ledger and capital are never shared.
pub struct BotActor {
    bot_id: String,
    state: BotState,
    cycle: TradingCycle,
    rx: mpsc::Receiver<BotCommand>,
    status_tx: watch::Sender<BotStatus>,
    clock: Clock,
    next_tick: Instant,
}

impl BotActor {
    /// Creates a new bot actor around `cycle`.
    #[must_use]
    pub fn new(
        bot_id: impl Into<String>,
        cycle: TradingCycle,
        rx: mpsc::Receiver<BotCommand>,
        status_tx: watch::Sender<BotStatus>,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            state: BotState::Starting,
            cycle,
            rx,
            status_tx,
            clock: Arc::new(Utc::now),
            next_tick: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Spawns the actor on the Tokio runtime and returns its handle.
    #[must_use]
    pub fn spawn(
        bot_id: impl Into<String>,
        cycle: TradingCycle,
        clock: Option<Clock>,
    ) -> (BotHandle, JoinHandle<Result<()>>) {
        let bot_id = bot_id.into();
        let (tx, rx) = mpsc::channel(32);
        let initial = BotStatus {
            bot_id: bot_id.clone(),
            state: BotState::Starting,
            last_heartbeat: Utc::now(),
            engine: cycle.snapshot(),
        };
        let (status_tx, status_rx) = watch::channel(initial);

        let mut actor = Self::new(bot_id, cycle, rx, status_tx);
        if let Some(clock) = clock {
            actor = actor.with_clock(clock);
        }

        let task = tokio::spawn(actor.run());
        (BotHandle::new(tx, status_rx), task)
    }

    fn status(&self) -> BotStatus {
        BotStatus {
            bot_id: self.bot_id.clone(),
            state: self.state,
            last_heartbeat: (self.clock)(),
            engine: self.cycle.snapshot(),
        }
    }

    fn publish_status(&self) {
        // Ignore if no receivers
        let _ = self.status_tx.send(self.status());
    }

    fn handle_command(&mut self, cmd: BotCommand) {
        match cmd {
            BotCommand::Enable => self.cycle.set_enabled(true),
            BotCommand::Disable => self.cycle.set_enabled(false),
            BotCommand::InjectSignal(direction) => {
                self.cycle.inject_signal(direction);
                // Act on it now rather than at the next scheduled tick.
                self.next_tick = Instant::now();
            }
            BotCommand::ResetDaily => self.cycle.reset_daily((self.clock)()),
            BotCommand::GetStatus(tx) => {
                let _ = tx.send(self.status());
                return;
            }
            BotCommand::GetPositions(tx) => {
                let _ = tx.send(self.cycle.open_positions());
                return;
            }
            BotCommand::Shutdown => return,
        }
        self.publish_status();
    }

    /// Runs the bot actor's main loop until `Shutdown` or until every handle
    /// has been dropped.
    ///
    /// # Errors
    /// Currently never fails; cycle errors are handled inside the cycle.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(bot_id = %self.bot_id, "Bot starting");
        self.state = BotState::Running;
        self.publish_status();

        loop {
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(BotCommand::Shutdown) | None => {
                        tracing::info!(bot_id = %self.bot_id, "Bot shutting down");
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd),
                },
                () = sleep_until(self.next_tick) => {
                    let delay = self.cycle.step((self.clock)()).await;
                    self.next_tick = Instant::now() + delay;
                    self.publish_status();
                }
            }
        }

        self.state = BotState::Stopped;
        self.publish_status();
        tracing::info!(bot_id = %self.bot_id, "Bot stopped");
        Ok(())
    }
}
