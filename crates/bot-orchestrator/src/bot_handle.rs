use crate::commands::{BotCommand, BotStatus};
use anyhow::{anyhow, Context, Result};
use scalper_core::{Direction, Position};
use tokio::sync::{mpsc, oneshot, watch};

#[derive(Clone)]
pub struct BotHandle {
    tx: mpsc::Sender<BotCommand>,
    status_rx: watch::Receiver<BotStatus>,
}

impl BotHandle {
    /// Creates a new bot handle with the given command sender and status feed.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<BotCommand>, status_rx: watch::Receiver<BotStatus>) -> Self {
        Self { tx, status_rx }
    }

    async fn send(&self, cmd: BotCommand) -> Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| anyhow!("bot actor has stopped"))
    }

    /// Allows new positions to be opened.
    ///
    /// # Errors
    /// Returns an error if the command cannot be sent to the bot actor.
    pub async fn enable(&self) -> Result<()> {
        self.send(BotCommand::Enable).await
    }

    /// Stops new positions from being opened. Open positions still exit.
    ///
    /// # Errors
    /// Returns an error if the command cannot be sent to the bot actor.
    pub async fn disable(&self) -> Result<()> {
        self.send(BotCommand::Disable).await
    }

    /// Submits an external signal. It is still subject to the risk gate.
    ///
    /// # Errors
    /// Returns an error if the command cannot be sent to the bot actor.
    pub async fn inject_signal(&self, direction: Direction) -> Result<()> {
        self.send(BotCommand::InjectSignal(direction)).await
    }

    /// # Errors
    /// Returns an error if the command cannot be sent to the bot actor.
    pub async fn reset_daily(&self) -> Result<()> {
        self.send(BotCommand::ResetDaily).await
    }

    /// Fresh status, computed by the actor after any queued commands.
    ///
    /// # Errors
    /// Fails if the actor is gone or drops the request.
    pub async fn get_status(&self) -> Result<BotStatus> {
        let (tx, rx) = oneshot::channel();
        self.send(BotCommand::GetStatus(tx)).await?;
        rx.await.context("bot actor dropped the status request")
    }

    /// # Errors
    /// Returns an error if the command cannot be sent or the response cannot be received.
    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        let (tx, rx) = oneshot::channel();
        self.send(BotCommand::GetPositions(tx)).await?;
        rx.await.context("bot actor dropped the positions request")
    }

    /// Latest published status without a round trip to the actor.
    #[must_use]
    pub fn latest_status(&self) -> BotStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver that wakes whenever the actor publishes a new status.
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<BotStatus> {
        self.status_rx.clone()
    }

    /// Asks the actor to stop after its current step.
    ///
    /// # Errors
    /// Fails if the actor is already gone.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(BotCommand::Shutdown).await
    }
}
