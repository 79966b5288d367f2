use std::{
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
  },
  time::{SystemTime, UNIX_EPOCH},
};

/// Source of the current time in unix seconds, used for `created` at signing and freshness checks at verification
pub trait Clock {
  /// Current unix timestamp in seconds
  fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
/// Clock reading the system time
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> u64 {
    // a system clock set before 1970 is treated as the epoch itself
    SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_secs())
      .unwrap_or_default()
  }
}

#[derive(Debug, Clone, Default)]
/// Adjustable clock. Clones share the same instant, so a handle kept by a test moves the clock seen by a signer or verifier.
pub struct MockClock {
  now: Arc<AtomicU64>,
}

impl MockClock {
  /// Construct a clock frozen at the given unix timestamp
  pub fn new(now: u64) -> Self {
    Self {
      now: Arc::new(AtomicU64::new(now)),
    }
  }

  /// Set the absolute instant
  pub fn set(&self, now: u64) {
    self.now.store(now, Ordering::Release);
  }

  /// Move the clock forward by `secs`
  pub fn advance(&self, secs: u64) {
    self.now.fetch_add(secs, Ordering::AcqRel);
  }
}

impl Clock for MockClock {
  fn now(&self) -> u64 {
    self.now.load(Ordering::Acquire)
  }
}
