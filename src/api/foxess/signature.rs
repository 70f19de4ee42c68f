use chrono::Utc;
use http::{
    HeaderMap,
    HeaderValue,
    header::{CONNECTION, CONTENT_TYPE, USER_AGENT},
};

use crate::prelude::*;

/// The cloud is picky about clients, so pretend to be a desktop browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

/// Request signature: the timestamp and the digest computed over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,

    /// Lowercase hexadecimal MD5 digest.
    pub digest: String,
}

impl Signature {
    /// WHOA-MEGA-SUPER-SECURE AUTHENTICATION!
    ///
    /// `path` is the endpoint path with the leading slash and without the query string.
    pub fn at(api_key: &str, path: &str, timestamp: i64) -> Self {
        // Dear FoxESS API developers… what were you smoking while making `\r\n` RAW LITERALS?!
        let digest = md5::compute(format!(r"{path}\r\n{api_key}\r\n{timestamp}").as_bytes());
        Self { timestamp, digest: format!("{digest:x}") }
    }

    pub fn now(api_key: &str, path: &str) -> Self {
        Self::at(api_key, path, Utc::now().timestamp_millis())
    }

    /// Build the complete set of authentication headers.
    pub fn headers(&self, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("token", HeaderValue::from_str(api_key).context("invalid API key")?);
        headers.insert("lang", HeaderValue::from_static("en"));
        headers.insert("timestamp", HeaderValue::from(self.timestamp));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("signature", HeaderValue::from_str(&self.digest)?);
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        Ok(headers)
    }
}

/// Sign the request to `path` with the current time.
pub fn sign(api_key: &str, path: &str) -> Result<HeaderMap> {
    Signature::now(api_key, path).headers(api_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let signature = Signature::at("my-api-key", "/op/v0/device/detail", 1_700_000_000_000);
        assert_eq!(signature.digest, "4132c9a368f32c16ca2cff78cd7fca9d");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            Signature::at("abc", "/op/v0/device/real/query", 1),
            Signature::at("abc", "/op/v0/device/real/query", 1),
        );
        assert_eq!(
            Signature::at("abc", "/op/v0/device/real/query", 1).digest,
            "6e9d13d068dbb7973a57d7fde781859a",
        );
    }

    #[test]
    fn test_digest_depends_on_timestamp() {
        assert_ne!(
            Signature::at("abc", "/op/v0/device/detail", 1).digest,
            Signature::at("abc", "/op/v0/device/detail", 2).digest,
        );
    }

    #[test]
    fn test_headers() -> Result {
        let headers = Signature::at("my-api-key", "/op/v0/device/detail", 1_700_000_000_000)
            .headers("my-api-key")?;
        assert_eq!(headers["token"], "my-api-key");
        assert_eq!(headers["lang"], "en");
        assert_eq!(headers["timestamp"], "1700000000000");
        assert_eq!(headers["signature"], "4132c9a368f32c16ca2cff78cd7fca9d");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[CONNECTION], "close");
        assert!(headers.contains_key(USER_AGENT));
        Ok(())
    }

    #[test]
    fn test_invalid_api_key() {
        assert!(sign("bad\nkey", "/op/v0/device/detail").is_err());
    }
}
