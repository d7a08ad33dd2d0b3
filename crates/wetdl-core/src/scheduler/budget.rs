//! Global byte budget shared across all transfers of a run.
//!
//! Every transfer reserves its declared size before writing a single body byte.
//! A reservation that would push the total past the cap is refused outright, so
//! the reserved total never exceeds the cap, not even transiently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ReleasePolicy;

/// Hard cap on cumulative bytes, with atomic check-and-reserve.
///
/// Reads and writes go through one atomic word; `try_reserve` is a compare-exchange
/// loop, so concurrent callers can never jointly overshoot the cap.
#[derive(Debug)]
pub struct ByteBudget {
    cap: u64,
    reserved: AtomicU64,
    policy: ReleasePolicy,
}

impl ByteBudget {
    pub fn new(cap: u64, policy: ReleasePolicy) -> Self {
        Self {
            cap,
            reserved: AtomicU64::new(0),
            policy,
        }
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    /// Bytes currently reserved or committed.
    pub fn reserved(&self) -> u64 {
        self.reserved.load(Ordering::Acquire)
    }

    /// Bytes still available (cap - reserved).
    pub fn remaining(&self) -> u64 {
        self.cap.saturating_sub(self.reserved())
    }

    /// Reserve exactly `amount` bytes if `reserved + amount <= cap`. Returns false and
    /// leaves the total unchanged otherwise. Zero-byte reservations are refused.
    pub fn try_reserve(&self, amount: u64) -> bool {
        if amount == 0 {
            return false;
        }
        let mut current = self.reserved.load(Ordering::Acquire);
        loop {
            let Some(next) = current.checked_add(amount).filter(|n| *n <= self.cap) else {
                return false;
            };
            match self.reserved.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Like `try_reserve` but returns a guard that hands the bytes back on drop
    /// (under `ReleasePolicy::Release`) unless it is committed.
    pub fn reserve(self: &Arc<Self>, amount: u64) -> Option<Reservation> {
        if !self.try_reserve(amount) {
            return None;
        }
        Some(Reservation {
            budget: Arc::clone(self),
            amount,
            committed: false,
        })
    }

    /// Return `amount` previously reserved bytes to the budget.
    pub fn release(&self, amount: u64) {
        let mut current = self.reserved.load(Ordering::Acquire);
        loop {
            let next = current.saturating_sub(amount);
            match self.reserved.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Bytes held against a `ByteBudget` for one in-flight transfer.
#[derive(Debug)]
pub struct Reservation {
    budget: Arc<ByteBudget>,
    amount: u64,
    committed: bool,
}

impl Reservation {
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Keep the bytes counted permanently (the transfer landed on disk).
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match self.budget.policy {
            ReleasePolicy::Release => {
                self.budget.release(self.amount);
                tracing::debug!(bytes = self.amount, "released reservation of failed transfer");
            }
            ReleasePolicy::Retain => {}
        }
    }
}
