//! Scripted controller for exercising the poll loop without a network.

use crate::api::ControllerApi;
use crate::error::{CommandError, FetchError};
use crossing::direction::Direction;
use crossing::state::{Counts, SignalReading};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::{mpsc, Mutex, Notify};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetSignal(Direction),
    EndOverride,
}

/// Each `fetch_state` call waits for the next scripted response on the feed.
pub struct FakeController {
    responses: Mutex<mpsc::UnboundedReceiver<Result<SignalReading, FetchError>>>,
    fetches: AtomicUsize,
    fetch_started: Notify,
    commands: StdMutex<Vec<Command>>,
    reject_commands: AtomicBool,
}

pub struct Feed {
    tx: mpsc::UnboundedSender<Result<SignalReading, FetchError>>,
}

impl Feed {
    pub fn reply(&self, reading: SignalReading) {
        let _ = self.tx.send(Ok(reading));
    }

    pub fn fail(&self) {
        let _ = self.tx.send(Err(FetchError::Status(503)));
    }
}

impl FakeController {
    pub fn new() -> (Self, Feed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                responses: Mutex::new(rx),
                fetches: AtomicUsize::new(0),
                fetch_started: Notify::new(),
                commands: StdMutex::new(Vec::new()),
                reject_commands: AtomicBool::new(false),
            },
            Feed { tx },
        )
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub async fn wait_for_fetch(&self) {
        self.fetch_started.notified().await;
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub fn reject_commands(&self, reject: bool) {
        self.reject_commands.store(reject, Ordering::SeqCst);
    }

    fn record(&self, cmd: Command) -> Result<(), CommandError> {
        self.commands.lock().unwrap().push(cmd);
        if self.reject_commands.load(Ordering::SeqCst) {
            return Err(CommandError::Rejected {
                status: 500,
                message: "scripted rejection".to_string(),
            });
        }
        Ok(())
    }
}

impl ControllerApi for FakeController {
    async fn fetch_state(&self) -> Result<SignalReading, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetch_started.notify_one();
        let mut rx = self.responses.lock().await;
        rx.recv()
            .await
            .unwrap_or_else(|| Err(FetchError::Malformed("feed closed".to_string())))
    }

    async fn set_signal(&self, direction: Direction) -> Result<(), CommandError> {
        self.record(Command::SetSignal(direction))
    }

    async fn end_override(&self) -> Result<(), CommandError> {
        self.record(Command::EndOverride)
    }
}

/// `{north:10, south:2, east:0, west:7}`, east green, manual override on.
pub fn scenario_a() -> SignalReading {
    SignalReading {
        counts: Counts::new(10, 2, 0, 7),
        signal: Direction::East,
        manual_override: true,
    }
}
