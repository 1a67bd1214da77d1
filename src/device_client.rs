#![cfg_attr(feature = "mock", allow(dead_code, unused_imports))]

use crate::{
    config::AppConfig,
    http_client::{device_http_client, handle_http_response, parse_status_body},
};
use anyhow::{Context, Result};
use log::{debug, info};
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use trait_variant::make;

/// HTTP access to the LED-strip controller.
///
/// `status` is the poll path: every response is evaluated, only a failed fetch is an
/// error. The other calls are ajax-style and fail on any non-success status, with the
/// status carried as [`crate::http_client::HttpStatusError`].
#[make(Send)]
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DeviceClient {
    async fn status(&self, path: &str, timeout: Duration) -> Result<Value>;
    async fn get_json(&self, path: &str) -> Result<Value>;
    async fn post_form(&self, path: &str, data: Vec<(String, String)>) -> Result<String>;
    async fn post_json(&self, path: &str, body: Value) -> Result<String>;
}

#[derive(Clone)]
pub struct LedstripDeviceClient {
    client: Client,
    base_url: String,
}

impl LedstripDeviceClient {
    pub const CONFIGURE_NETWORK_ENDPOINT: &str = "/configure_network";

    pub fn new() -> Result<Self> {
        Self::with_base_url(&AppConfig::get().device.url)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = device_http_client(base_url)?;

        Ok(LedstripDeviceClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        // Normalize path to always start with a single "/"
        let normalized_path = path.trim_start_matches('/');
        format!("{}/{normalized_path}", self.base_url)
    }
}

impl DeviceClient for LedstripDeviceClient {
    async fn status(&self, path: &str, timeout: Duration) -> Result<Value> {
        let url = self.build_url(path);
        debug!("GET {url} (timeout {timeout:?})");

        let res = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .context(format!("failed to send GET request to {url}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context(format!("failed to read response body from {url}"))?;

        if !status.is_success() {
            debug!("GET {url} returned {status}, evaluating body anyway");
        }

        Ok(parse_status_body(&body))
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.build_url(path);
        info!("GET {url}");

        let res = self
            .client
            .get(&url)
            .send()
            .await
            .context(format!("failed to send GET request to {url}"))?;

        let body = handle_http_response(res, &format!("GET {url}")).await?;
        serde_json::from_str(&body).context(format!("failed to parse response of {url}"))
    }

    async fn post_form(&self, path: &str, data: Vec<(String, String)>) -> Result<String> {
        let url = self.build_url(path);
        let fields: Vec<&str> = data.iter().map(|(key, _)| key.as_str()).collect();
        info!("POST {url} with fields: {fields:?}");

        let res = self
            .client
            .post(&url)
            .form(&data)
            .send()
            .await
            .context(format!("failed to send POST request to {url}"))?;

        handle_http_response(res, &format!("POST {url}")).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<String> {
        let url = self.build_url(path);
        info!("POST {url} with body: {body}");

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context(format!("failed to send POST request to {url}"))?;

        handle_http_response(res, &format!("POST {url}")).await
    }
}
