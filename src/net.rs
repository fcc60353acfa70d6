use std::time::Duration;

use thiserror::Error;

const USER_AGENT: &str = concat!("socorro/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum NetError {
    #[error("network support is disabled in this build")]
    Disabled,
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered with status {0}")]
    Status(u16),
}

/// Blocking GET with query parameters, returning the body on 2xx.
#[cfg(feature = "network")]
pub fn get_text(url: &str, query: &[(&str, String)], timeout: Duration) -> Result<String, NetError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| NetError::Request(e.to_string()))?;
    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|e| NetError::Request(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(NetError::Status(status.as_u16()));
    }
    response.text().map_err(|e| NetError::Request(e.to_string()))
}

#[cfg(not(feature = "network"))]
pub fn get_text(_url: &str, _query: &[(&str, String)], _timeout: Duration) -> Result<String, NetError> {
    let _ = USER_AGENT;
    Err(NetError::Disabled)
}
