//! Bounded retry with backoff for gateway calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::GatewayError;

const BASE_DELAY_MS: u64 = 250;

/// Run `op` up to `1 + max_retries` times, backing off exponentially between
/// attempts. Only transient faults are retried; the last error is returned
/// unchanged when attempts run out.
pub(crate) async fn with_retry<T, F, Fut>(max_retries: u32, mut op: F) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries && is_transient(&e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS << attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Gateway call failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_transient(error: &GatewayError) -> bool {
    match error {
        GatewayError::Timeout(_) | GatewayError::RequestFailed { .. } => true,
        GatewayError::BadStatus { status, .. } => *status == 429 || *status >= 500,
        GatewayError::InvalidResponse(_) => false,
    }
}
