//! Operator override commands.
//!
//! Commands go straight to the controller and never touch local state; the
//! next applied poll is what shows their effect. Failures are logged here and
//! returned to the caller, nothing is retried.

use crate::api::ControllerApi;
use crate::error::CommandError;
use crate::sync::Synchronizer;
use crossing::direction::Direction;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct OverrideController<C> {
    sync: Synchronizer<C>,
}

impl<C> Clone for OverrideController<C> {
    fn clone(&self) -> Self {
        Self {
            sync: self.sync.clone(),
        }
    }
}

impl<C: ControllerApi> OverrideController<C> {
    pub fn new(sync: Synchronizer<C>) -> Self {
        Self { sync }
    }

    /// Controls are disabled while the controller is offline.
    pub fn enabled(&self) -> bool {
        self.sync.status().allows_commands()
    }

    fn ensure_enabled(&self) -> Result<(), CommandError> {
        if self.enabled() {
            Ok(())
        } else {
            Err(CommandError::ControlsDisabled)
        }
    }

    /// Force `direction` green.
    pub async fn select_direction(&self, direction: Direction) -> Result<(), CommandError> {
        self.ensure_enabled()?;
        let result = self.sync.api().set_signal(direction).await;
        match &result {
            Ok(()) => info!(%direction, "manual override requested"),
            Err(e) => warn!(%direction, error = %e, "override command failed"),
        }
        result
    }

    /// Hand control back to the automated controller.
    pub async fn end_override(&self) -> Result<(), CommandError> {
        self.ensure_enabled()?;
        let result = self.sync.api().end_override().await;
        match &result {
            Ok(()) => info!("override release requested"),
            Err(e) => warn!(error = %e, "end-override command failed"),
        }
        result
    }

    /// Fire-and-forget variant of [`select_direction`](Self::select_direction).
    pub fn dispatch_select(&self, direction: Direction) -> JoinHandle<Result<(), CommandError>> {
        let this = self.clone();
        tokio::spawn(async move { this.select_direction(direction).await })
    }

    /// Fire-and-forget variant of [`end_override`](Self::end_override).
    pub fn dispatch_end(&self) -> JoinHandle<Result<(), CommandError>> {
        let this = self.clone();
        tokio::spawn(async move { this.end_override().await })
    }
}
