//! Simulated environment with a virtual clock and seeded RNG.
//!
//! Time only moves when a test advances it (directly or through
//! [`Environment::sleep`]), and every random byte comes from a ChaCha stream
//! seeded by the test, so a scenario replays identically.

use std::{
    ops::{Add, Sub},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use relaychat_core::Environment;

/// Wall-clock time at virtual instant zero (2023-11-14T22:13:20Z).
const START_UNIX_SECS: i64 = 1_700_000_000;

/// Point on the virtual clock, measured from simulation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Simulation start.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Time since simulation start.
    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

struct Inner {
    clock: Mutex<Duration>,
    rng: Mutex<ChaCha8Rng>,
    start: DateTime<Utc>,
}

/// Deterministic environment for tests.
///
/// Clones share the same clock and RNG.
#[derive(Clone)]
pub struct SimEnv {
    inner: Arc<Inner>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SimEnv {
    /// Environment seeded with zero.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment with a specific RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let start = DateTime::from_timestamp(START_UNIX_SECS, 0).unwrap_or_default();
        Self {
            inner: Arc::new(Inner {
                clock: Mutex::new(Duration::ZERO),
                rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
                start,
            }),
        }
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut clock = lock(&self.inner.clock);
        *clock = clock.saturating_add(duration);
    }

    /// Time since simulation start.
    pub fn elapsed(&self) -> Duration {
        *lock(&self.inner.clock)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.elapsed())
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        self.inner.start + TimeDelta::from_std(self.elapsed()).unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        lock(&self.inner.rng).fill_bytes(buffer);
    }
}
