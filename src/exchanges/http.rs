//! HTTP plumbing shared by the marketplace adapters

use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::shared::errors::{AdapterError, AppError};

const USER_AGENT: &str = concat!("p2parb/", env!("CARGO_PKG_VERSION"));

/// Per-adapter HTTP behaviour
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub retries: u32,
    pub retry_backoff: Duration,
}

impl HttpSettings {
    pub fn build_client(&self) -> Result<Client, AppError> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
    }
}

/// Transient failures worth another attempt
pub fn is_retryable(err: &AdapterError) -> bool {
    match err {
        AdapterError::Network(_) | AdapterError::Timeout(_) => true,
        AdapterError::HttpStatus(status) => *status == 429 || *status >= 500,
        _ => false,
    }
}

/// Run `op` up to `retries + 1` times, sleeping `backoff` between attempts
pub async fn with_retries<T, F, Fut>(
    label: &str,
    retries: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < retries && is_retryable(&err) => {
                attempt += 1;
                warn!("{} failed (attempt {}/{}): {}", label, attempt, retries + 1, err);
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result = with_retries("test", 2, Duration::ZERO, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AdapterError::HttpStatus(503))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_structural_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries("test", 5, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AdapterError::Parse("bad".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(AdapterError::Parse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retries("test", 1, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AdapterError::Network("reset".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(AdapterError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
