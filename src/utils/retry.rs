/// Fixed-backoff retry with a bounded timeout
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Retries `f` until it returns `Ok(true)`, an error, or the timeout expires.
///
/// `Ok(false)` schedules a new attempt after the backoff period. A timeout is
/// reported as `Ok(false)`, not as an error; it lands within one backoff
/// interval of the deadline. `f` runs at least once, and attempts within one
/// call are strictly sequential.
///
/// The loop sleeps on the tokio clock, so dropping the returned future (or
/// wrapping it in `tokio::time::timeout`) cancels it promptly.
pub async fn retry<F, Fut, E>(timeout: Duration, backoff: Duration, mut f: F) -> Result<bool, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let start = Instant::now();
    loop {
        if f().await? {
            return Ok(true);
        }
        if start.elapsed() >= timeout {
            return Ok(false);
        }
        sleep(backoff).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_attempts() {
        let attempts = AtomicU32::new(0);

        let done = retry::<_, _, anyhow::Error>(
            Duration::from_secs(10),
            Duration::from_secs(1),
            || async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                Ok(n >= 2)
            },
        )
        .await
        .unwrap();

        assert!(done);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_timeout_is_not_an_error() {
        let start = Instant::now();

        let done = retry::<_, _, anyhow::Error>(
            Duration::from_secs(5),
            Duration::from_secs(1),
            || async { Ok(false) },
        )
        .await
        .unwrap();

        assert!(!done);
        // within one backoff interval of the deadline
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() <= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_error_stops_immediately() {
        let attempts = AtomicU32::new(0);

        let result = retry(Duration::from_secs(10), Duration::from_secs(1), || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err::<bool, _>(anyhow::anyhow!("boom"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_runs_at_least_once() {
        let attempts = AtomicU32::new(0);

        let done = retry::<_, _, anyhow::Error>(Duration::ZERO, Duration::from_secs(1), || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        })
        .await
        .unwrap();

        assert!(done);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
