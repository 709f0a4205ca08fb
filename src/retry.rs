//! Repeating failed list requests of the kube-backed client.
//!
//! The `get` command itself never retries; a policy only lives inside
//! [`KubeMirrorClient`](crate::client::KubeMirrorClient).

use std::{future::Future, iter, num::NonZeroUsize, time::Duration};

use kube::Error as KubeError;
use tokio::time::sleep;
use tracing::warn;

/// How many times a request is sent and how long to wait in between.
///
/// Waits start at `first_delay` and double up to `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: NonZeroUsize,
    first_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// One initial request plus up to `retries` repeats.
    pub fn from_retries(retries: usize) -> Self {
        Self {
            attempts: NonZeroUsize::MIN.saturating_add(retries),
            first_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_delays(mut self, first_delay: Duration, max_delay: Duration) -> Self {
        self.first_delay = first_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn attempts(&self) -> NonZeroUsize {
        self.attempts
    }

    /// Waits between consecutive attempts, one fewer than the number of attempts.
    fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let max_delay = self.max_delay;
        iter::successors(Some(self.first_delay.min(max_delay)), move |delay| {
            Some(delay.saturating_mul(2).min(max_delay))
        })
        .take(self.attempts.get() - 1)
    }

    /// Send `request` until it succeeds, fails permanently, or attempts run out.
    /// The last error is returned as is.
    pub async fn run<T, F, Fut>(&self, mut request: F) -> Result<T, KubeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, KubeError>>,
    {
        let mut delays = self.delays();
        loop {
            let error = match request().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            if !is_transient(&error) {
                return Err(error);
            }
            let Some(delay) = delays.next() else {
                return Err(error);
            };
            warn!(?delay, %error, "mirror request failed, retrying");
            sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_retries(2)
    }
}

/// `408`, `429` and `5xx` responses may succeed later, as may transport failures.
/// Any other API status is final.
pub fn is_transient(error: &KubeError) -> bool {
    match error {
        KubeError::Api(status) => matches!(status.code, 408 | 429 | 500..=599),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kube::{Error as KubeError, core::ErrorResponse};

    use super::{RetryPolicy, is_transient};

    fn status(code: u16) -> KubeError {
        KubeError::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("status={code}"),
            reason: "Test".to_string(),
            code,
        })
    }

    fn immediate(retries: usize) -> RetryPolicy {
        RetryPolicy::from_retries(retries).with_delays(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn repeats_transient_failures_until_success() {
        let mut sent = 0usize;
        let value = immediate(4)
            .run(|| {
                sent += 1;
                let current = sent;
                async move {
                    if current < 3 {
                        Err(status(503))
                    } else {
                        Ok(current)
                    }
                }
            })
            .await
            .expect("third request succeeds");

        assert_eq!(value, 3);
        assert_eq!(sent, 3);
    }

    #[tokio::test]
    async fn gives_up_after_last_attempt() {
        let mut sent = 0usize;
        let err = immediate(2)
            .run::<(), _, _>(|| {
                sent += 1;
                async { Err(status(500)) }
            })
            .await
            .expect_err("every request fails");

        assert!(matches!(err, KubeError::Api(status) if status.code == 500));
        assert_eq!(sent, 3);
    }

    #[tokio::test]
    async fn final_status_is_not_repeated() {
        let mut sent = 0usize;
        let _ = immediate(5)
            .run::<(), _, _>(|| {
                sent += 1;
                async { Err(status(404)) }
            })
            .await;

        assert_eq!(sent, 1);
    }

    #[tokio::test]
    async fn zero_retries_sends_once() {
        let mut sent = 0usize;
        let _ = immediate(0)
            .run::<(), _, _>(|| {
                sent += 1;
                async { Err(status(503)) }
            })
            .await;

        assert_eq!(sent, 1);
    }

    #[test]
    fn delays_double_up_to_cap() {
        let policy = RetryPolicy::from_retries(4)
            .with_delays(Duration::from_millis(300), Duration::from_secs(1));
        assert_eq!(
            policy.delays().collect::<Vec<_>>(),
            vec![
                Duration::from_millis(300),
                Duration::from_millis(600),
                Duration::from_secs(1),
                Duration::from_secs(1),
            ]
        );
        assert_eq!(RetryPolicy::from_retries(0).delays().count(), 0);
        assert_eq!(RetryPolicy::default().attempts().get(), 3);
    }

    #[test]
    fn classifies_statuses() {
        for code in [408, 429, 500, 503] {
            assert!(is_transient(&status(code)), "code {code}");
        }
        for code in [400, 403, 404, 409] {
            assert!(!is_transient(&status(code)), "code {code}");
        }
    }
}
