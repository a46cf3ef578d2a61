//! Poll loop and state publication.
//!
//! A [`Synchronizer`] owns the [`Reconciler`] (the only writer of the state
//! record) behind a short-lived lock and publishes every applied snapshot on a
//! `watch` channel. Readers never see a half-updated record: each publication
//! is a whole [`View`].

use crate::api::ControllerApi;
use crate::overrides::OverrideController;
use crossing::fallback::FallbackSimulator;
use crossing::reconcile::{Attempt, Reconciler};
use crossing::state::{ConnectivityStatus, IntersectionState};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What renderers consume: the state record plus the derived badge.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub state: IntersectionState,
    pub status: ConnectivityStatus,
}

struct Inner<C> {
    api: C,
    interval: Mutex<Duration>,
    reconciler: Mutex<Reconciler>,
    view_tx: watch::Sender<View>,
    poller: Mutex<Option<CancellationToken>>,
}

/// Cheap-to-clone handle; clones share one poll loop and one state record.
pub struct Synchronizer<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for Synchronizer<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: ControllerApi> Synchronizer<C> {
    pub fn new(api: C, interval: Duration, simulator: FallbackSimulator) -> Self {
        let reconciler = Reconciler::new(simulator);
        let (view_tx, _) = watch::channel(View {
            state: reconciler.state().clone(),
            status: reconciler.status(),
        });
        Self {
            inner: Arc::new(Inner {
                api,
                interval: Mutex::new(interval),
                reconciler: Mutex::new(reconciler),
                view_tx,
                poller: Mutex::new(None),
            }),
        }
    }

    pub fn api(&self) -> &C {
        &self.inner.api
    }

    /// Cadence of the current (or next) poll loop.
    pub fn interval(&self) -> Duration {
        *self
            .inner
            .interval
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.inner.view_tx.subscribe()
    }

    pub fn view(&self) -> View {
        self.inner.view_tx.borrow().clone()
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.reconciler().status()
    }

    pub fn overrides(&self) -> OverrideController<C> {
        OverrideController::new(self.clone())
    }

    /// Start polling at the configured cadence.
    pub fn start(&self) -> bool {
        self.start_every(self.interval())
    }

    /// Start polling. The first attempt runs immediately, then one per `interval`.
    ///
    /// Must be called from within a tokio runtime. Returns `false` if already
    /// polling or if `interval` is zero.
    pub fn start_every(&self, interval: Duration) -> bool {
        if interval.is_zero() {
            warn!("refusing to poll with a zero interval");
            return false;
        }

        let token = CancellationToken::new();
        {
            // Token goes in under the reconciler lock so a racing `stop` always finds it.
            let mut rec = self.reconciler();
            if !rec.start() {
                return false;
            }
            if let Some(old) = self.poller().replace(token.clone()) {
                old.cancel();
            }
            *self
                .inner
                .interval
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = interval;
            self.publish(&rec);
        }

        let this = self.clone();
        tokio::spawn(async move { this.run(token, interval).await });
        info!(interval_ms = interval.as_millis() as u64, "polling started");
        true
    }

    /// Stop polling. Results of attempts issued before this call are discarded.
    pub fn stop(&self) -> bool {
        {
            let mut rec = self.reconciler();
            if !rec.stop() {
                return false;
            }
            if let Some(token) = self.poller().take() {
                token.cancel();
            }
            self.publish(&rec);
        }
        info!("polling paused");
        true
    }

    async fn run(self, token: CancellationToken, interval: Duration) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = self.sync_once() => {}
            }
        }
        debug!("poll loop exited");
    }

    /// Run one synchronization attempt now.
    ///
    /// Returns the published view, or `None` if the attempt was skipped (paused,
    /// or another attempt in flight) or its result arrived stale. Dropping the
    /// future mid-fetch releases the attempt, so later polls are not blocked.
    pub async fn sync_once(&self) -> Option<View> {
        let attempt = self.reconciler().begin_attempt();
        let Some(attempt) = attempt else {
            debug!("poll skipped: paused or attempt in flight");
            return None;
        };
        let pending = PendingAttempt {
            sync: self,
            attempt: Some(attempt),
        };

        let fetched = self.inner.api.fetch_state().await;
        pending.disarm();
        let outcome = match fetched {
            Ok(reading) => Some(reading),
            Err(e) => {
                debug!(seq = attempt.seq(), error = %e, "fetch failed");
                None
            }
        };
        let failed = outcome.is_none();

        let mut rec = self.reconciler();
        let before = rec.status();
        if rec.settle(attempt, outcome, SystemTime::now()).is_none() {
            debug!(seq = attempt.seq(), "dropping stale poll result");
            return None;
        }
        let after = rec.status();
        let view = self.publish(&rec);
        drop(rec);

        if before != after {
            match after {
                ConnectivityStatus::Offline if failed => {
                    warn!(from = %before, "controller unreachable; showing simulated counts")
                }
                _ => info!(from = %before, to = %after, "connectivity changed"),
            }
        }
        Some(view)
    }

    fn publish(&self, rec: &Reconciler) -> View {
        let view = View {
            state: rec.state().clone(),
            status: rec.status(),
        };
        self.inner.view_tx.send_replace(view.clone());
        view
    }

    fn reconciler(&self) -> MutexGuard<'_, Reconciler> {
        self.inner
            .reconciler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn poller(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the in-flight slot if a `sync_once` future is dropped before settling.
struct PendingAttempt<'a, C: ControllerApi> {
    sync: &'a Synchronizer<C>,
    attempt: Option<Attempt>,
}

impl<C: ControllerApi> PendingAttempt<'_, C> {
    fn disarm(mut self) {
        self.attempt = None;
    }
}

impl<C: ControllerApi> Drop for PendingAttempt<'_, C> {
    fn drop(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            if self.sync.reconciler().abandon_attempt(attempt) {
                debug!(seq = attempt.seq(), "poll attempt abandoned");
            }
        }
    }
}
