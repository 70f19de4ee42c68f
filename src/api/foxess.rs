//! [FoxESS Cloud OpenAPI](https://www.foxesscloud.com/public/i18n/en/OpenApiDocument.html) client.

#[cfg(test)]
pub mod fake;
mod models;
mod rate_limiter;
mod response;
mod signature;
pub mod variables;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};

pub use self::{
    models::{BatterySettings, DailyGeneration, DeviceDetail, RealTimeRawVariable, ReportVariable},
    rate_limiter::RateLimiter,
};
use self::{models::DeviceRealTimeData, response::Response, signature::sign};
use crate::prelude::*;

const BASE_URL: &str = "https://www.foxesscloud.com";

/// The cloud is slow, sometimes really slow.
const TIMEOUT: Duration = Duration::from_secs(75);

/// The calls the poller makes.
///
/// Any failure (transport, timeout, empty body, malformed JSON, or an API error code)
/// is just an error, the callers do not distinguish between them.
#[async_trait]
pub trait FoxCloud: Sync {
    async fn get_device_detail(&self, serial_number: &str) -> Result<DeviceDetail>;

    async fn get_battery_settings(&self, serial_number: &str) -> Result<BatterySettings>;

    async fn get_real_time_variables(
        &self,
        serial_number: &str,
    ) -> Result<Vec<RealTimeRawVariable>>;

    /// Daily aggregates of the specified month, one array per variable.
    async fn get_monthly_report(
        &self,
        serial_number: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ReportVariable>>;

    async fn get_daily_generation(&self, serial_number: &str) -> Result<DailyGeneration>;
}

pub struct Api {
    client: Client,
    api_key: String,
    rate_limiter: Arc<RateLimiter>,
}

impl Api {
    /// Build a client.
    ///
    /// The rate limiter must be shared by all the clients of the process,
    /// the cloud enforces the limit per account.
    pub fn new(api_key: String, rate_limiter: Arc<RateLimiter>, verify_tls: bool) -> Result<Self> {
        if !verify_tls {
            debug!("TLS certificate verification is disabled");
        }
        let client = Client::builder()
            .timeout(TIMEOUT)
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;
        Ok(Self { client, api_key, rate_limiter })
    }

    async fn get<Q, R>(&self, path: &str, query: &Q) -> Result<R>
    where
        Q: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.send(path, self.client.get(format!("{BASE_URL}{path}")).query(query)).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.send(path, self.client.post(format!("{BASE_URL}{path}")).json(body)).await
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(path = path))]
    async fn send<R: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<R> {
        self.rate_limiter.acquire().await;
        let body = request
            .headers(sign(&self.api_key, path)?)
            .send()
            .await
            .with_context(|| format!("failed to call `{path}`"))?
            .error_for_status()
            .with_context(|| format!("`{path}` failed"))?
            .text()
            .await
            .with_context(|| format!("failed to read `{path}` response"))?;
        debug!(body, "call succeeded");
        Response::parse(&body).with_context(|| format!("`{path}` responded with an error"))
    }
}

#[async_trait]
impl FoxCloud for Api {
    #[instrument(skip_all, fields(serial_number = serial_number))]
    async fn get_device_detail(&self, serial_number: &str) -> Result<DeviceDetail> {
        let detail: DeviceDetail = self
            .get("/op/v0/device/detail", &SerialNumberQuery { serial_number })
            .await
            .context("failed to get the device detail")?;
        debug!(detail.has_battery, ?detail.status, "fetched");
        Ok(detail)
    }

    #[instrument(skip_all, fields(serial_number = serial_number))]
    async fn get_battery_settings(&self, serial_number: &str) -> Result<BatterySettings> {
        let settings: BatterySettings = self
            .get("/op/v0/device/battery/soc/get", &SerialNumberQuery { serial_number })
            .await
            .context("failed to get the battery settings")?;
        debug!(?settings.min_soc, ?settings.min_soc_on_grid, "fetched");
        Ok(settings)
    }

    #[instrument(skip_all, fields(serial_number = serial_number))]
    async fn get_real_time_variables(
        &self,
        serial_number: &str,
    ) -> Result<Vec<RealTimeRawVariable>> {
        #[derive(Serialize)]
        struct GetRealTimeDataRequest<'a> {
            #[serde(rename = "sn")]
            serial_number: &'a str,

            variables: &'a [&'a str],
        }

        let request = GetRealTimeDataRequest { serial_number, variables: variables::REAL_TIME };
        self.post::<_, Vec<DeviceRealTimeData>>("/op/v0/device/real/query", &request)
            .await
            .context("failed to get the real-time variables")?
            .into_iter()
            .next()
            .map(|device| device.variables)
            .with_context(|| format!("no device `{serial_number}` in the response"))
    }

    #[instrument(skip_all, fields(serial_number = serial_number, year = year, month = month))]
    async fn get_monthly_report(
        &self,
        serial_number: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ReportVariable>> {
        #[derive(Serialize)]
        struct GetReportRequest<'a> {
            #[serde(rename = "sn")]
            serial_number: &'a str,

            year: i32,
            month: u32,
            dimension: &'a str,
            variables: &'a [&'a str],
        }

        let request = GetReportRequest {
            serial_number,
            year,
            month,
            dimension: "month",
            variables: variables::REPORT,
        };
        self.post("/op/v0/device/report/query", &request)
            .await
            .context("failed to get the monthly report")
    }

    #[instrument(skip_all, fields(serial_number = serial_number))]
    async fn get_daily_generation(&self, serial_number: &str) -> Result<DailyGeneration> {
        #[derive(Serialize)]
        struct GetGenerationRequest<'a> {
            #[serde(rename = "sn")]
            serial_number: &'a str,

            dimension: &'a str,
        }

        let path = "/op/v0/device/generation";
        let request = self
            .client
            .get(format!("{BASE_URL}{path}"))
            .query(&SerialNumberQuery { serial_number })
            .json(&GetGenerationRequest { serial_number, dimension: "day" });
        self.send(path, request).await.context("failed to get the daily generation")
    }
}

#[derive(Serialize)]
struct SerialNumberQuery<'a> {
    #[serde(rename = "sn")]
    serial_number: &'a str,
}
