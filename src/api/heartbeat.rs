use std::time::Duration;

use reqwest::{Client as HttpClient, Url};

use crate::prelude::*;

/// Optional liveness ping, for example to a Better Stack or Healthchecks monitor.
#[derive(Clone)]
pub struct Client(Option<Url>);

impl Client {
    pub const fn new(url: Option<Url>) -> Self {
        Self(url)
    }

    /// Send the heartbeat, if configured.
    ///
    /// Failures are only logged, the heartbeat must never stop the poller.
    pub async fn send(&self) {
        if let Some(url) = &self.0
            && let Err(error) = send(url.clone()).await
        {
            warn!("failed to send the heartbeat: {error:#}");
        }
    }
}

#[instrument(skip_all)]
async fn send(url: Url) -> Result {
    debug!("sending a heartbeat…");
    HttpClient::builder()
        .timeout(Duration::from_secs(3))
        .build()?
        .post(url)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_is_noop() {
        Client::new(None).send().await;
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() -> Result {
        // Nothing listens on the discard port.
        Client::new(Some(Url::parse("http://127.0.0.1:9/")?)).send().await;
        Ok(())
    }
}
