//! Fallback traffic simulation.
//!
//! While the controller is unreachable the dashboard keeps moving with counts
//! drawn from fixed per-direction ranges. These values are a demo degradation
//! mode, never a prediction; states built from them are tagged
//! [`CountSource::Simulated`](crate::state::CountSource::Simulated).

use crate::direction::Direction;
use crate::prng::Prng;
use crate::state::Counts;
use std::fmt;

/// Inclusive `min..=max` range for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: u32) -> bool {
        (self.min..=self.max).contains(&v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeError {
    pub direction: Direction,
    pub range: CountRange,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fallback range for {} is inverted ({} > {})",
            self.direction, self.range.min, self.range.max
        )
    }
}

impl std::error::Error for RangeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FallbackRanges {
    pub north: CountRange,
    pub south: CountRange,
    pub east: CountRange,
    pub west: CountRange,
}

impl Default for FallbackRanges {
    fn default() -> Self {
        Self {
            north: CountRange::new(5, 24),
            south: CountRange::new(3, 17),
            east: CountRange::new(2, 13),
            west: CountRange::new(4, 21),
        }
    }
}

impl FallbackRanges {
    pub fn get(&self, d: Direction) -> CountRange {
        match d {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn validate(&self) -> Result<(), RangeError> {
        for d in Direction::ALL {
            let range = self.get(d);
            if range.min > range.max {
                return Err(RangeError {
                    direction: d,
                    range,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FallbackSimulator {
    ranges: FallbackRanges,
    rng: Prng,
}

impl FallbackSimulator {
    pub fn new(ranges: FallbackRanges, seed: u64) -> Self {
        Self {
            ranges,
            rng: Prng::new(seed),
        }
    }

    pub fn from_clock(ranges: FallbackRanges) -> Self {
        Self {
            ranges,
            rng: Prng::from_clock(),
        }
    }

    pub fn ranges(&self) -> &FallbackRanges {
        &self.ranges
    }

    /// Draw one independent value per direction.
    pub fn sample(&mut self) -> Counts {
        let mut counts = Counts::default();
        for d in Direction::ALL {
            let r = self.ranges.get(d);
            counts.set(d, self.rng.gen_range_u32_inclusive(r.min, r.max));
        }
        counts
    }
}
