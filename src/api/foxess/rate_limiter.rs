use std::time::Duration;

use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};

use crate::prelude::*;

/// FoxESS Cloud allows at most one OpenAPI call per second per account.
const MIN_CALL_GAP: Duration = Duration::from_secs(1);

/// Added on top of the remaining gap, the cloud clock is not that precise.
const SAFETY_MARGIN: Duration = Duration::from_millis(200);

/// Process-wide throttle shared by all the clients, regardless of the device they talk to.
///
/// The lock is held while waiting, so concurrent callers queue up one by one.
#[derive(Default)]
pub struct RateLimiter {
    last_call_at: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Wait until the next call is allowed and mark it as made.
    pub async fn acquire(&self) {
        let mut last_call_at = self.last_call_at.lock().await;
        if let Some(last_call_at) = *last_call_at {
            let elapsed = last_call_at.elapsed();
            if elapsed < MIN_CALL_GAP {
                let delay = MIN_CALL_GAP - elapsed + SAFETY_MARGIN;
                debug!(?delay, "throttling…");
                sleep(delay).await;
            }
        }
        *last_call_at = Some(Instant::now());
    }
}
