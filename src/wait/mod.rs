/// Poll-based condition waiting
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::Result;
use crate::resources::GenericClient;
use crate::utils::retry::retry;

/// Timeout and poll interval for one wait call
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitOptions {
    /// Wait up to `timeout`, polling once per second
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Duration::from_secs(1),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Polls the object until the predicate is satisfied, it signals failure,
/// or the timeout expires.
///
/// Each tick fetches the object as `T` and applies the predicate:
/// `Ok(true)` ends the wait with `Ok(true)`; an error ends it immediately
/// (the object entered a failure state); `Ok(false)` re-polls after the
/// interval. An object that does not exist yet counts as "not yet
/// satisfied". Running out of time is a valid negative outcome, `Ok(false)`,
/// not an error.
///
/// Polls are strictly sequential, and the wait is cancelled promptly by
/// dropping the returned future.
pub async fn wait_for<T, P>(
    client: &GenericClient,
    kind: &str,
    name: &str,
    namespace: &str,
    options: WaitOptions,
    predicate: P,
) -> Result<bool>
where
    T: DeserializeOwned,
    P: Fn(&T) -> Result<bool>,
{
    debug!("waiting up to {:?} for {} '{}'", options.timeout, kind, name);
    let structured = client.structured();
    let structured = &structured;
    let predicate = &predicate;

    retry(options.timeout, options.interval, move || async move {
        match structured.get::<T>(kind, name, namespace).await {
            Ok(obj) => predicate(&obj),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    })
    .await
}

/// Like [`wait_for`], but resolves to a value extracted from the object.
/// `Ok(None)` means the timeout elapsed before `extract` produced one.
pub async fn wait_value<T, V, F>(
    client: &GenericClient,
    kind: &str,
    name: &str,
    namespace: &str,
    options: WaitOptions,
    extract: F,
) -> Result<Option<V>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<Option<V>>,
{
    debug!("waiting up to {:?} for {} '{}'", options.timeout, kind, name);
    let structured = client.structured();
    let start = Instant::now();

    loop {
        match structured.get::<T>(kind, name, namespace).await {
            Ok(obj) => {
                if let Some(value) = extract(&obj)? {
                    return Ok(Some(value));
                }
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
        if start.elapsed() >= options.timeout {
            return Ok(None);
        }
        sleep(options.interval).await;
    }
}
