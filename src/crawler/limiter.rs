//! Process-wide admission control for requests
//!
//! A counting semaphore shared by every fetch of a run. Permits are released
//! when the returned guard drops, so a permit cannot leak past the fetch that
//! holds it even on early return.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of logical fetches in flight
///
/// Cloning yields another handle to the same permits.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// A held admission; dropping it releases the permit
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    /// Creates a limiter admitting at most `limit` concurrent holders
    ///
    /// A limit of zero is raised to one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Waits until fewer than `limit` permits are held, then takes one
    ///
    /// Waiters are admitted in FIFO order.
    pub async fn acquire(&self) -> Permit {
        // The semaphore is owned by this limiter and never closed
        match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => Permit { _permit: permit },
            Err(_) => unreachable!("rate limiter semaphore closed"),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits currently held
    pub fn in_flight(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let limiter = RateLimiter::new(2);
        assert_eq!(limiter.in_flight(), 0);

        let first = limiter.acquire().await;
        let _second = limiter.acquire().await;
        assert_eq!(limiter.in_flight(), 2);

        drop(first);
        assert_eq!(limiter.in_flight(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_is_raised() {
        let limiter = RateLimiter::new(0);
        assert_eq!(limiter.limit(), 1);
        let _permit = limiter.acquire().await;
    }

    #[tokio::test]
    async fn test_acquire_blocks_at_limit() {
        let limiter = RateLimiter::new(1);
        let held = limiter.acquire().await;

        let waiting = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(waiting.is_err(), "second acquire should block");

        drop(held);
        let admitted = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
        assert!(admitted.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_never_more_than_limit_in_flight() {
        let limiter = RateLimiter::new(3);
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..24 {
            let limiter = limiter.clone();
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            tasks.push(tokio::spawn(async move {
                let _permit = limiter.acquire().await;
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(limiter.in_flight(), 0);
    }
}
