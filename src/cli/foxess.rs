use std::sync::Arc;

use clap::Parser;

use crate::{
    api::foxess::{Api, RateLimiter},
    prelude::*,
};

#[derive(Parser)]
pub struct FoxEssApiArgs {
    #[clap(long = "api-key", env = "FOX_ESS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[clap(long, alias = "serial", env = "FOX_ESS_SERIAL_NUMBER")]
    pub serial_number: String,

    /// Verify the cloud's TLS certificate.
    #[clap(long, env = "VERIFY_TLS")]
    pub verify_tls: bool,
}

impl FoxEssApiArgs {
    pub fn validate(&self) -> Result {
        ensure!(!self.api_key.trim().is_empty(), "the API key must not be empty");
        ensure!(!self.serial_number.trim().is_empty(), "the serial number must not be empty");
        Ok(())
    }

    /// All the clients of the process must share the same rate limiter.
    pub fn new_client(&self, rate_limiter: Arc<RateLimiter>) -> Result<Api> {
        self.validate()?;
        if !self.verify_tls {
            debug!("TLS certificate verification is off");
        }
        Api::new(self.api_key.clone(), rate_limiter, self.verify_tls)
    }
}
