//! Deadline-bounded polling.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout_at, Instant};

/// Runs `check` every `interval` until it returns true or `timeout` elapses.
///
/// Returns whether `check` succeeded. The first check runs immediately and a
/// last one runs at the deadline, so a timeout is reported no earlier than
/// `timeout`. A check still running at the deadline is abandoned and counts
/// as not ready. A timeout too large to represent means no deadline.
/// Dropping the returned future stops polling.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now().checked_add(timeout);

    loop {
        let ready = match deadline {
            Some(deadline) => timeout_at(deadline, check()).await.unwrap_or(false),
            None => check().await,
        };
        if ready {
            return true;
        }

        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return false;
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        sleep(pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let start = Instant::now();
        let ok = poll_until(Duration::from_secs(5), Duration::from_secs(1), || async { true }).await;

        assert!(ok);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_some_polls() {
        let mut calls = 0;
        let ok = poll_until(Duration::from_secs(10), Duration::from_secs(1), || {
            calls += 1;
            let ready = calls >= 3;
            async move { ready }
        })
        .await;

        assert!(ok);
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_respected() {
        let timeout = Duration::from_millis(2500);
        let interval = Duration::from_secs(1);
        let start = Instant::now();

        let ok = poll_until(timeout, interval, || async { false }).await;
        let elapsed = start.elapsed();

        assert!(!ok);
        assert!(elapsed >= timeout);
        assert!(elapsed <= timeout + interval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_checks_once() {
        let mut calls = 0;
        let ok = poll_until(Duration::ZERO, Duration::from_secs(1), || {
            calls += 1;
            async { false }
        })
        .await;

        assert!(!ok);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_check_cut_off_at_deadline() {
        let timeout = Duration::from_secs(2);
        let interval = Duration::from_secs(1);
        let start = Instant::now();

        let ok = poll_until(timeout, interval, || async {
            sleep(Duration::from_secs(10)).await;
            true
        })
        .await;
        let elapsed = start.elapsed();

        assert!(!ok);
        assert!(elapsed >= timeout);
        assert!(elapsed <= timeout + interval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_timeout_means_no_deadline() {
        let ok = poll_until(Duration::from_secs(u64::MAX), Duration::from_secs(1), || async {
            true
        })
        .await;
        assert!(ok);

        let mut calls = 0;
        let ok = poll_until(Duration::MAX, Duration::from_secs(1), || {
            calls += 1;
            let ready = calls >= 4;
            async move { ready }
        })
        .await;
        assert!(ok);
        assert_eq!(calls, 4);
    }
}
