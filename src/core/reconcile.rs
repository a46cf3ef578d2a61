//! Poll bookkeeping and the single writer of [`IntersectionState`].
//!
//! Every poll attempt is issued through [`Reconciler::begin_attempt`] and its
//! outcome handed back through [`Reconciler::settle`]. The ledger tags attempts
//! with an epoch (bumped by `start`/`stop`) and a sequence number, so results
//! that arrive after a pause, or out of order, are dropped instead of applied.

use crate::fallback::FallbackSimulator;
use crate::state::{ConnectivityStatus, IntersectionState, SignalReading};
use std::time::SystemTime;

/// Ticket for one in-flight poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    epoch: u64,
    seq: u64,
}

impl Attempt {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    polling: bool,
    last_fetch_succeeded: bool,
    epoch: u64,
    next_seq: u64,
    last_applied_seq: u64,
    in_flight: Option<Attempt>,
}

impl Ledger {
    /// Returns `false` if polling was already enabled.
    ///
    /// A fresh epoch starts unconfirmed: status reads `Offline` until the first
    /// attempt of the epoch succeeds.
    pub fn start(&mut self) -> bool {
        if self.polling {
            return false;
        }
        self.polling = true;
        self.epoch += 1;
        self.last_fetch_succeeded = false;
        self.in_flight = None;
        true
    }

    /// Returns `false` if polling was already disabled. Any attempt still in
    /// flight belongs to the ended epoch and will be rejected on settle.
    pub fn stop(&mut self) -> bool {
        if !self.polling {
            return false;
        }
        self.polling = false;
        self.epoch += 1;
        self.in_flight = None;
        true
    }

    /// `None` while paused or while another attempt is outstanding.
    pub fn begin(&mut self) -> Option<Attempt> {
        if !self.polling || self.in_flight.is_some() {
            return None;
        }
        self.next_seq += 1;
        let attempt = Attempt {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.in_flight = Some(attempt);
        Some(attempt)
    }

    /// Give up on an attempt that will never settle (its future was dropped).
    /// Frees the in-flight slot without touching status or sequence ordering.
    pub fn abandon(&mut self, attempt: Attempt) -> bool {
        if self.in_flight == Some(attempt) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    /// Record an attempt's outcome. Returns `true` if it should be applied.
    pub fn settle(&mut self, attempt: Attempt, succeeded: bool) -> bool {
        if self.in_flight == Some(attempt) {
            self.in_flight = None;
        }
        if !self.polling || attempt.epoch != self.epoch || attempt.seq <= self.last_applied_seq {
            return false;
        }
        self.last_applied_seq = attempt.seq;
        self.last_fetch_succeeded = succeeded;
        true
    }

    pub fn status(&self) -> ConnectivityStatus {
        ConnectivityStatus::derive(self.polling, self.last_fetch_succeeded)
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn in_flight(&self) -> Option<Attempt> {
        self.in_flight
    }

    pub fn last_applied_seq(&self) -> u64 {
        self.last_applied_seq
    }
}

/// Owns the current state and the only code path that replaces it.
#[derive(Debug, Clone)]
pub struct Reconciler {
    ledger: Ledger,
    simulator: FallbackSimulator,
    state: IntersectionState,
}

impl Reconciler {
    pub fn new(simulator: FallbackSimulator) -> Self {
        Self {
            ledger: Ledger::default(),
            simulator,
            state: IntersectionState::default(),
        }
    }

    pub fn state(&self) -> &IntersectionState {
        &self.state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.ledger.status()
    }

    pub fn start(&mut self) -> bool {
        self.ledger.start()
    }

    pub fn stop(&mut self) -> bool {
        self.ledger.stop()
    }

    pub fn begin_attempt(&mut self) -> Option<Attempt> {
        self.ledger.begin()
    }

    pub fn abandon_attempt(&mut self, attempt: Attempt) -> bool {
        self.ledger.abandon(attempt)
    }

    /// Apply one attempt's outcome.
    ///
    /// `Some(reading)` is the success path and is adopted verbatim. `None` is the
    /// failure path: signal and override flag are kept, counts are simulated.
    /// Returns the new snapshot, or `None` if the attempt was stale.
    pub fn settle(
        &mut self,
        attempt: Attempt,
        outcome: Option<SignalReading>,
        now: SystemTime,
    ) -> Option<IntersectionState> {
        if !self.ledger.settle(attempt, outcome.is_some()) {
            return None;
        }

        let next = match outcome {
            Some(reading) => IntersectionState::from_reading(&reading, now),
            None => self
                .state
                .with_simulated_counts(self.simulator.sample(), now),
        };
        self.state = next.clone();
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use crate::fallback::FallbackRanges;
    use crate::state::{CountSource, Counts};
    use std::time::Duration;

    fn reconciler() -> Reconciler {
        Reconciler::new(FallbackSimulator::new(FallbackRanges::default(), 99))
    }

    fn scenario_a_reading() -> SignalReading {
        SignalReading {
            counts: Counts::new(10, 2, 0, 7),
            signal: Direction::East,
            manual_override: true,
        }
    }

    #[test]
    fn paused_until_started() {
        let mut rec = reconciler();
        assert_eq!(rec.status(), ConnectivityStatus::Paused);
        assert!(rec.begin_attempt().is_none());
        assert!(rec.start());
        assert!(!rec.start());
        assert_eq!(rec.status(), ConnectivityStatus::Offline);
    }

    #[test]
    fn success_adopts_reading_verbatim() {
        let mut rec = reconciler();
        rec.start();
        let now = SystemTime::now();
        let a = rec.begin_attempt().unwrap();
        let s = rec.settle(a, Some(scenario_a_reading()), now).unwrap();

        assert_eq!(s.counts, Counts::new(10, 2, 0, 7));
        assert_eq!(s.active_signal, Direction::East);
        assert!(s.manual_override);
        assert_eq!(s.last_updated, Some(now));
        assert_eq!(s.source, CountSource::Remote);
        assert_eq!(rec.status(), ConnectivityStatus::Live);
    }

    #[test]
    fn failure_keeps_signal_and_override_and_simulates_counts() {
        let mut rec = reconciler();
        rec.start();
        let t0 = SystemTime::now();
        let a = rec.begin_attempt().unwrap();
        rec.settle(a, Some(scenario_a_reading()), t0);

        let t1 = t0 + Duration::from_millis(500);
        let b = rec.begin_attempt().unwrap();
        let s = rec.settle(b, None, t1).unwrap();

        assert_eq!(rec.status(), ConnectivityStatus::Offline);
        assert_eq!(s.active_signal, Direction::East);
        assert!(s.manual_override);
        assert_eq!(s.last_updated, Some(t1));
        assert_eq!(s.source, CountSource::Simulated);
        let ranges = FallbackRanges::default();
        for (d, v) in s.counts.iter() {
            assert!(ranges.get(d).contains(v));
        }
    }

    #[test]
    fn offline_recovers_to_live() {
        let mut rec = reconciler();
        rec.start();
        let now = SystemTime::now();
        let a = rec.begin_attempt().unwrap();
        rec.settle(a, None, now);
        assert_eq!(rec.status(), ConnectivityStatus::Offline);

        let b = rec.begin_attempt().unwrap();
        rec.settle(b, Some(scenario_a_reading()), now);
        assert_eq!(rec.status(), ConnectivityStatus::Live);
    }

    #[test]
    fn only_one_attempt_in_flight() {
        let mut rec = reconciler();
        rec.start();
        let a = rec.begin_attempt().unwrap();
        assert!(rec.begin_attempt().is_none());
        assert_eq!(rec.ledger().in_flight(), Some(a));
        rec.settle(a, None, SystemTime::now());
        let b = rec.begin_attempt().unwrap();
        assert!(b.seq() > a.seq());
    }

    #[test]
    fn abandoned_attempt_frees_the_slot() {
        let mut rec = reconciler();
        rec.start();
        let a = rec.begin_attempt().unwrap();
        rec.settle(a, Some(scenario_a_reading()), SystemTime::now());

        let lost = rec.begin_attempt().unwrap();
        assert!(rec.begin_attempt().is_none());
        assert!(rec.abandon_attempt(lost));
        assert!(!rec.abandon_attempt(lost));
        assert_eq!(rec.ledger().in_flight(), None);
        // Abandoning is not an outcome.
        assert_eq!(rec.status(), ConnectivityStatus::Live);
        assert_eq!(rec.state().source, CountSource::Remote);

        let next = rec.begin_attempt().unwrap();
        assert!(next.seq() > lost.seq());
        assert!(rec.settle(next, None, SystemTime::now()).is_some());
        assert_eq!(rec.status(), ConnectivityStatus::Offline);
    }

    #[test]
    fn abandoning_a_stale_attempt_keeps_the_current_one() {
        let mut rec = reconciler();
        rec.start();
        let stale = rec.begin_attempt().unwrap();
        rec.stop();
        rec.start();
        let fresh = rec.begin_attempt().unwrap();
        assert!(!rec.abandon_attempt(stale));
        assert_eq!(rec.ledger().in_flight(), Some(fresh));
    }

    #[test]
    fn restart_reads_offline_until_first_success() {
        let mut rec = reconciler();
        rec.start();
        let a = rec.begin_attempt().unwrap();
        rec.settle(a, Some(scenario_a_reading()), SystemTime::now());
        assert_eq!(rec.status(), ConnectivityStatus::Live);

        rec.stop();
        assert_eq!(rec.status(), ConnectivityStatus::Paused);
        rec.start();
        assert_eq!(rec.status(), ConnectivityStatus::Offline);
        assert!(!rec.status().allows_commands());
        // The last confirmed record is still what renderers see.
        assert_eq!(rec.state().source, CountSource::Remote);
        assert_eq!(rec.state().active_signal, Direction::East);
    }

    #[test]
    fn result_issued_before_stop_is_dropped() {
        let mut rec = reconciler();
        rec.start();
        let a = rec.begin_attempt().unwrap();
        rec.stop();

        let before = rec.state().clone();
        assert!(rec
            .settle(a, Some(scenario_a_reading()), SystemTime::now())
            .is_none());
        assert_eq!(rec.state(), &before);
        assert_eq!(rec.status(), ConnectivityStatus::Paused);
    }

    #[test]
    fn result_from_previous_epoch_is_dropped_after_restart() {
        let mut rec = reconciler();
        rec.start();
        let stale = rec.begin_attempt().unwrap();
        rec.stop();
        rec.start();

        let fresh = rec.begin_attempt().unwrap();
        assert_ne!(stale.epoch(), fresh.epoch());
        assert!(rec
            .settle(stale, Some(scenario_a_reading()), SystemTime::now())
            .is_none());
        // The stale settle must not clear the new epoch's guard.
        assert_eq!(rec.ledger().in_flight(), Some(fresh));
        assert!(rec.settle(fresh, None, SystemTime::now()).is_some());
    }

    #[test]
    fn older_sequence_never_overwrites_newer() {
        let mut ledger = Ledger::default();
        ledger.start();
        let first = ledger.begin().unwrap();
        assert!(ledger.settle(first, true));
        let second = ledger.begin().unwrap();
        assert!(ledger.settle(second, false));
        assert!(!ledger.settle(first, true));
        assert_eq!(ledger.last_applied_seq(), second.seq());
        assert_eq!(ledger.status(), ConnectivityStatus::Offline);
    }

    #[test]
    fn every_reachable_state_has_one_green() {
        let mut rec = reconciler();
        rec.start();
        let readings = [
            Some(scenario_a_reading()),
            None,
            Some(SignalReading {
                counts: Counts::default(),
                signal: Direction::South,
                manual_override: false,
            }),
            None,
            None,
        ];
        for outcome in readings {
            let a = rec.begin_attempt().unwrap();
            let s = rec.settle(a, outcome, SystemTime::now()).unwrap();
            assert_eq!(s.lamps().iter().filter(|l| l.is_active()).count(), 1);
        }
    }
}
