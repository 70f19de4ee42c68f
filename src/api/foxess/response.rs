use serde::{Deserialize, de::DeserializeOwned};

use crate::prelude::*;

/// Generic API response.
///
/// The body is read as text first, because the cloud sometimes responds with nothing at all.
#[derive(Deserialize)]
pub struct Response<R> {
    /// Error code (when the result is not equal to zero, the request failed).
    #[serde(rename = "errno")]
    error_code: i32,

    #[serde(rename = "msg")]
    message: Option<String>,

    #[serde(rename = "result")]
    result: Option<R>,
}

impl<R: DeserializeOwned> Response<R> {
    /// Parse and validate the raw response body.
    pub fn parse(body: &str) -> Result<R> {
        ensure!(!body.trim().is_empty(), "empty response body");
        serde_json::from_str::<Self>(body).context("failed to deserialize the response")?.into()
    }
}

impl<R> From<Response<R>> for Result<R> {
    fn from(response: Response<R>) -> Self {
        match (response.error_code, response.message) {
            (0, Some(message)) if message == "success" => {
                response.result.context("the response has no result")
            }
            (0, Some(message)) => bail!(r#"FoxESS Cloud responded with "{message}""#),
            (0, None) => bail!("FoxESS Cloud responded without a message"),
            (error_code, Some(message)) => {
                bail!(r#"FoxESS Cloud error {error_code} ("{message}")"#)
            }
            (error_code, None) => bail!("FoxESS Cloud error {error_code}"),
        }
    }
}
