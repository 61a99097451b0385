//! Admission Gate - bounded concurrency for the read path.
//!
//! The gate hands out at most `capacity` permits at a time. A caller waits up
//! to its timeout for a free slot and is denied afterwards; the caller is
//! expected to surface the denial rather than retry. Permits release their
//! slot on drop, so every exit path returns it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_CAPACITY: usize = 10;

/// Counting gate backed by `Mutex<usize>` + `Condvar`.
#[derive(Debug)]
pub struct AdmissionGate {
    in_flight: Mutex<usize>,
    wake: Condvar,
    capacity: usize,
    admitted: AtomicU64,
    rejected: AtomicU64,
}

impl AdmissionGate {
    /// Create a gate with `capacity` slots. A capacity of zero admits nobody.
    pub fn new(capacity: usize) -> Self {
        Self {
            in_flight: Mutex::new(0),
            wake: Condvar::new(),
            capacity,
            admitted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait up to `timeout` for a free slot.
    ///
    /// A zero timeout checks once and never blocks.
    pub fn acquire(&self, timeout: Duration) -> Result<Permit<'_>, AdmissionError> {
        let started = Instant::now();
        // An unrepresentable deadline waits indefinitely.
        let deadline = started.checked_add(timeout);
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| AdmissionError::Poisoned)?;

        while *in_flight >= self.capacity {
            in_flight = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(self.deny(started.elapsed()));
                    }
                    self.wake
                        .wait_timeout(in_flight, deadline - now)
                        .map_err(|_| AdmissionError::Poisoned)?
                        .0
                }
                None => self
                    .wake
                    .wait(in_flight)
                    .map_err(|_| AdmissionError::Poisoned)?,
            };
        }

        *in_flight += 1;
        self.admitted.fetch_add(1, Ordering::Relaxed);
        Ok(Permit { gate: self })
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Result<Permit<'_>, AdmissionError> {
        self.acquire(Duration::ZERO)
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        match self.in_flight.lock() {
            Ok(count) => *count,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn stats(&self) -> GateStats {
        GateStats {
            capacity: self.capacity,
            in_flight: self.in_flight(),
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    fn deny(&self, waited: Duration) -> AdmissionError {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(capacity = self.capacity, ?waited, "admission denied");
        AdmissionError::Denied {
            capacity: self.capacity,
            waited,
        }
    }

    fn release(&self) {
        // Poisoning must not leak a slot.
        let mut in_flight = match self.in_flight.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *in_flight = in_flight.saturating_sub(1);
        self.wake.notify_one();
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// RAII slot: releases on drop.
#[must_use = "the slot is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// No slot freed up before the timeout.
    Denied { capacity: usize, waited: Duration },
    /// The gate's mutex was poisoned.
    Poisoned,
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionError::Denied { capacity, waited } => write!(
                f,
                "admission denied: all {} slots busy after {:?}",
                capacity, waited
            ),
            AdmissionError::Poisoned => write!(f, "admission gate poisoned"),
        }
    }
}

impl std::error::Error for AdmissionError {}

/// Observable gate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStats {
    pub capacity: usize,
    pub in_flight: usize,
    pub admitted: u64,
    pub rejected: u64,
}
