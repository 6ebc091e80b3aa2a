use std::time::Duration;

/// Wait before the first retry, in units.
pub const INITIAL_UNITS: u32 = 2;

/// Upper bound on a single wait, in units.
pub const MAX_UNITS: u32 = 60;

/// A doubled wait of this many units is replaced by [`SNAPPED_UNITS`].
const SNAP_FROM_UNITS: u32 = 16;
const SNAPPED_UNITS: u32 = 15;

/// Deterministic backoff schedule: `2, 4, 8, 15, 30, 60, 60, ...` units.
///
/// Iterating yields the wait before each retry; the schedule never ends.
#[derive(Debug, Clone)]
pub struct Backoff {
  unit: Duration,
  units: u32,
}

impl Backoff {
  pub fn new(unit: Duration) -> Self {
    Self {
      unit,
      units: INITIAL_UNITS,
    }
  }
}

impl Iterator for Backoff {
  type Item = Duration;

  fn next(&mut self) -> Option<Duration> {
    let current = self.units;
    self.units = step(current);
    Some(self.unit * current)
  }
}

fn step(units: u32) -> u32 {
  let doubled = units.saturating_mul(2);
  if doubled == SNAP_FROM_UNITS {
    SNAPPED_UNITS
  } else {
    doubled.min(MAX_UNITS)
  }
}
