use crate::direction::Direction;
use std::fmt;
use std::time::SystemTime;

/// Vehicle count per approach. Every direction always has a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counts {
    pub north: u32,
    pub south: u32,
    pub east: u32,
    pub west: u32,
}

impl Counts {
    pub fn new(north: u32, south: u32, east: u32, west: u32) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    pub fn get(&self, d: Direction) -> u32 {
        match d {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn set(&mut self, d: Direction, value: u32) {
        match d {
            Direction::North => self.north = value,
            Direction::South => self.south = value,
            Direction::East => self.east = value,
            Direction::West => self.west = value,
        }
    }

    /// `(direction, count)` pairs in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, u32)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    pub fn total(&self) -> u64 {
        self.iter().map(|(_, c)| u64::from(c)).sum()
    }
}

/// Where the counts of a state record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CountSource {
    /// Nothing reconciled yet; counts are the zero defaults.
    #[default]
    Initial,
    /// Reported by the remote controller.
    Remote,
    /// Generated locally while the controller was unreachable. Not a measurement.
    Simulated,
}

/// A validated reading from the remote controller.
///
/// Holding one of these means the payload had the right shape and a signal from
/// the four-direction set; wire decoding is responsible for rejecting anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalReading {
    pub counts: Counts,
    pub signal: Direction,
    pub manual_override: bool,
}

/// Local mirror of the intersection. Replaced wholesale on every applied cycle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionState {
    pub counts: Counts,
    pub active_signal: Direction,
    pub manual_override: bool,
    pub last_updated: Option<SystemTime>,
    pub source: CountSource,
}

impl Default for IntersectionState {
    fn default() -> Self {
        Self {
            counts: Counts::default(),
            active_signal: Direction::North,
            manual_override: false,
            last_updated: None,
            source: CountSource::Initial,
        }
    }
}

impl IntersectionState {
    /// Adopt a remote reading verbatim.
    pub fn from_reading(reading: &SignalReading, now: SystemTime) -> Self {
        Self {
            counts: reading.counts,
            active_signal: reading.signal,
            manual_override: reading.manual_override,
            last_updated: Some(now),
            source: CountSource::Remote,
        }
    }

    /// Keep the signal and override flag, swap in simulated counts.
    pub fn with_simulated_counts(&self, counts: Counts, now: SystemTime) -> Self {
        Self {
            counts,
            active_signal: self.active_signal,
            manual_override: self.manual_override,
            last_updated: Some(now),
            source: CountSource::Simulated,
        }
    }

    /// Lamp encoding for renderers; exactly one entry is `Green`.
    pub fn lamps(&self) -> [SignalLamp; 4] {
        Direction::ALL.map(|direction| SignalLamp {
            direction,
            lamp: if direction == self.active_signal {
                Lamp::Green
            } else {
                Lamp::Red
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lamp {
    Green,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalLamp {
    pub direction: Direction,
    pub lamp: Lamp,
}

impl SignalLamp {
    pub fn is_active(&self) -> bool {
        self.lamp == Lamp::Green
    }
}

/// Derived connectivity badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum ConnectivityStatus {
    /// Polling and the last attempt succeeded.
    Live,
    /// Polling switched off by the operator.
    Paused,
    /// Polling but the last attempt failed (or none has succeeded yet).
    Offline,
}

impl ConnectivityStatus {
    pub fn derive(polling_enabled: bool, last_fetch_succeeded: bool) -> Self {
        match (polling_enabled, last_fetch_succeeded) {
            (false, _) => ConnectivityStatus::Paused,
            (true, true) => ConnectivityStatus::Live,
            (true, false) => ConnectivityStatus::Offline,
        }
    }

    /// Override commands are pointless against an unreachable controller.
    pub fn allows_commands(self) -> bool {
        self != ConnectivityStatus::Offline
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectivityStatus::Live => "LIVE",
            ConnectivityStatus::Paused => "PAUSED",
            ConnectivityStatus::Offline => "OFFLINE",
        }
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
