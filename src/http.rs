use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};

use crate::config::SupabaseConfig;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const CLIENT_INFO: &str = concat!("supaenv/", env!("CARGO_PKG_VERSION"));

const APIKEY: HeaderName = HeaderName::from_static("apikey");
const X_CLIENT_INFO: HeaderName = HeaderName::from_static("x-client-info");

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("anon key is not a valid header value: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

pub fn default_headers(cfg: &SupabaseConfig) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut apikey = HeaderValue::from_str(cfg.anon_key())?;
    apikey.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", cfg.anon_key()))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(APIKEY, apikey);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(X_CLIENT_INFO, HeaderValue::from_static(CLIENT_INFO));
    Ok(headers)
}

pub fn build_client(cfg: &SupabaseConfig) -> Result<reqwest::Client, TransportError> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .default_headers(default_headers(cfg)?)
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_carry_key_and_bearer() {
        let cfg = SupabaseConfig::new("https://abcd.supabase.co", "anon-key").unwrap();

        let headers = default_headers(&cfg).unwrap();

        assert_eq!(headers.get("apikey").unwrap(), "anon-key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer anon-key");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert!(
            headers
                .get("x-client-info")
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("supaenv/")
        );
    }

    #[test]
    fn default_headers_reject_control_characters() {
        let cfg = SupabaseConfig::new("https://abcd.supabase.co", "bad\u{7f}key").unwrap();
        assert!(default_headers(&cfg).is_err());
    }
}
