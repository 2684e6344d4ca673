//! Test-controlled scheduler ticks and status waits

use std::time::Duration;

use async_trait::async_trait;
use sponsor_server::sync::{SyncState, SyncStatus, Ticker};
use tokio::sync::{mpsc, watch};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Ticker that fires once per `TickSender::tick` call
pub struct ChannelTicker {
    rx: mpsc::UnboundedReceiver<()>,
}

#[derive(Clone)]
pub struct TickSender {
    tx: mpsc::UnboundedSender<()>,
}

impl TickSender {
    pub fn tick(&self) {
        self.tx.send(()).expect("Scheduler should be running");
    }
}

impl ChannelTicker {
    pub fn new() -> (Self, TickSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, TickSender { tx })
    }
}

#[async_trait]
impl Ticker for ChannelTicker {
    async fn tick(&mut self) {
        if self.rx.recv().await.is_none() {
            // Sender gone: never tick again
            std::future::pending::<()>().await;
        }
    }
}

/// Wait until cycle `cycle` has finished
pub async fn wait_for_cycle(status: &mut watch::Receiver<SyncStatus>, cycle: u64) -> SyncStatus {
    tokio::time::timeout(
        WAIT_TIMEOUT,
        status.wait_for(|s| s.cycles_run >= cycle),
    )
    .await
    .expect("Timed out waiting for sync cycle")
    .expect("Scheduler dropped status channel")
    .clone()
}

/// Wait until the scheduler reports `state`
pub async fn wait_for_state(status: &mut watch::Receiver<SyncStatus>, state: SyncState) -> SyncStatus {
    tokio::time::timeout(WAIT_TIMEOUT, status.wait_for(|s| s.state == state))
        .await
        .expect("Timed out waiting for sync state")
        .expect("Scheduler dropped status channel")
        .clone()
}
