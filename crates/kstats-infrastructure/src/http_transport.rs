//! HTTP delivery of reports.

use async_trait::async_trait;
use kstats_core::error::{Result, TelemetryError};
use kstats_core::report::Report;
use kstats_core::upload::{Transport, TransportError};
use kstats_core::{COMPONENT_NAME, COMPONENT_VERSION, PROTOCOL_VERSION};
use reqwest::Client;
use std::time::Duration;

pub const HEADER_COMPONENT: &str = "X-Kstats-Component";
pub const HEADER_VERSION: &str = "X-Kstats-Version";
pub const HEADER_PROTOCOL: &str = "X-Kstats-Protocol";

/// POSTs each report as JSON to the submit endpoint.
///
/// The response status alone decides the outcome: any 2xx is delivered.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    submit_url: String,
}

impl HttpTransport {
    pub fn new(submit_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            submit_url: submit_url.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, report: &Report) -> std::result::Result<(), TransportError> {
        let body =
            serde_json::to_vec(report).map_err(|e| TransportError::Encoding(e.to_string()))?;

        let response = self
            .client
            .post(&self.submit_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(HEADER_COMPONENT, COMPONENT_NAME)
            .header(HEADER_VERSION, COMPONENT_VERSION)
            .header(HEADER_PROTOCOL, PROTOCOL_VERSION.to_string())
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("[HttpTransport] report accepted with status {}", status);
            Ok(())
        } else {
            Err(TransportError::Status(status.as_u16()))
        }
    }
}
