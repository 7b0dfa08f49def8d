//! Admission control for worker processes.
//!
//! A [`TicketPool`] is a counting semaphore. Every live worker holds one
//! [`Ticket`]; the ticket goes back to the pool when it is dropped, so an early
//! return or a panic while driving a worker cannot leak capacity.

use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tracing::trace;

/// Ticket acquisition did not complete; nothing is owed back to the pool.
#[derive(Error, Debug)]
#[error("worker ticket pool is unusable: its lock was poisoned")]
pub struct AcquireError;

/// Fixed-size pool of worker admission tickets.
#[derive(Debug)]
pub struct TicketPool {
    capacity: usize,
    available: Mutex<usize>,
    released: Condvar,
}

impl TicketPool {
    /// Create a pool with `capacity` tickets (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            available: Mutex::new(capacity),
            released: Condvar::new(),
        }
    }

    /// Create a pool sized `multiplier × available parallelism`.
    pub fn for_available_parallelism(multiplier: usize) -> Self {
        Self::new(available_parallelism() * multiplier.max(1))
    }

    /// Total number of tickets.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tickets not currently held.
    pub fn available(&self) -> usize {
        *self.available.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a ticket is free and take it. There is no timeout.
    pub fn acquire(&self) -> Result<Ticket<'_>, AcquireError> {
        let start = Instant::now();
        let mut available = self.available.lock().map_err(|_| AcquireError)?;
        while *available == 0 {
            available = self.released.wait(available).map_err(|_| AcquireError)?;
        }
        *available -= 1;
        trace!(
            remaining = *available,
            capacity = self.capacity,
            wait_ms = start.elapsed().as_millis(),
            "Acquired worker ticket"
        );
        Ok(Ticket { pool: self })
    }

    /// Take a ticket only if one is free right now.
    pub fn try_acquire(&self) -> Option<Ticket<'_>> {
        let mut available = self.available.lock().ok()?;
        if *available == 0 {
            return None;
        }
        *available -= 1;
        Some(Ticket { pool: self })
    }

    fn release(&self) {
        let mut available = self.available.lock().unwrap_or_else(PoisonError::into_inner);
        *available += 1;
        debug_assert!(*available <= self.capacity);
        drop(available);
        self.released.notify_one();
    }
}

/// A held admission ticket. Released exactly once, on drop.
#[derive(Debug)]
#[must_use = "dropping a ticket releases it immediately"]
pub struct Ticket<'a> {
    pool: &'a TicketPool,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_is_clamped() {
        let pool = TicketPool::new(0);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_parallelism_sizing() {
        let pool = TicketPool::for_available_parallelism(2);
        assert_eq!(pool.capacity(), available_parallelism() * 2);
    }

    #[test]
    fn test_drop_releases() {
        let pool = TicketPool::new(2);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_eq!(pool.available(), 0);
        assert!(pool.try_acquire().is_none());
        drop(a);
        assert_eq!(pool.available(), 1);
        drop(b);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_release_on_panic() {
        let pool = TicketPool::new(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ticket = pool.acquire().unwrap();
            panic!("worker driver blew up");
        }));
        assert!(result.is_err());
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_acquire_blocks_until_release() {
        let pool = Arc::new(TicketPool::new(1));
        let held = pool.acquire().unwrap();

        let acquired = Arc::new(AtomicUsize::new(0));
        let waiter = {
            let pool = Arc::clone(&pool);
            let acquired = Arc::clone(&acquired);
            std::thread::spawn(move || {
                let _ticket = pool.acquire().unwrap();
                acquired.fetch_add(1, Ordering::SeqCst);
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(acquired.load(Ordering::SeqCst), 0);

        drop(held);
        waiter.join().unwrap();
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_concurrency_never_exceeds_capacity() {
        let pool = Arc::new(TicketPool::new(3));
        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let live = Arc::clone(&live);
                let peak = Arc::clone(&peak);
                std::thread::spawn(move || {
                    let _ticket = pool.acquire().unwrap();
                    let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(5));
                    live.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(pool.available(), 3);
    }
}
