use anyhow::{Context, Result, ensure};
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::fmt;

/// Non-success HTTP status returned by the device.
///
/// Carried inside `anyhow::Error` so callers can downcast and branch on 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatusError {
    pub status: StatusCode,
    pub body: String,
}

impl HttpStatusError {
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {} and body: {}", self.status, self.body)
    }
}

impl std::error::Error for HttpStatusError {}

/// Create an HTTP client for the controller at `base_url`.
///
/// # Arguments
/// * `base_url` - Device address with `http://` or `https://` scheme
///
/// # Examples
/// ```no_run
/// use rgbw_ui::http_client::device_http_client;
///
/// let client = device_http_client("http://192.168.4.1")
///     .expect("failed to create client");
/// ```
pub fn device_http_client(base_url: &str) -> Result<Client> {
    ensure!(
        base_url.starts_with("http://") || base_url.starts_with("https://"),
        "failed since device url has no http(s) scheme: {base_url:?}"
    );

    Client::builder()
        .build()
        .context("failed to create device HTTP client")
}

/// Handle HTTP response by checking status and extracting body
///
/// # Arguments
/// * `res` - The HTTP response to handle
/// * `context_msg` - Context message describing the request (e.g., "POST /configure_network")
///
/// # Returns
/// * `Ok(String)` - The response body if the status is successful
/// * `Err` - An [`HttpStatusError`] with context if the status is not successful, or a
///   body read error
pub async fn handle_http_response(res: Response, context_msg: &str) -> Result<String> {
    let status = res.status();
    let body = res.text().await.context("failed to read response body")?;

    if !status.is_success() {
        return Err(HttpStatusError { status, body }).context(format!("{context_msg} failed"));
    }

    Ok(body)
}

/// Extract the [`HttpStatusError`] from an error chain, if there is one.
pub fn status_error(error: &anyhow::Error) -> Option<&HttpStatusError> {
    error.chain().find_map(|e| e.downcast_ref::<HttpStatusError>())
}

/// Parse a status body; anything that is not JSON becomes `Value::Null`.
///
/// A malformed body must look exactly like a status that is not finished yet.
pub fn parse_status_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| {
        debug!("status body is not json ({e}): {body:?}");
        Value::Null
    })
}
