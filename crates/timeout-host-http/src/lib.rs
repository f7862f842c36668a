//! HTTP host for timeoutd
//!
//! Talks to the server that owns the session:
//! - `GET <base_url><sign_out_path>` to invalidate it
//! - builds the site-relative sign-in redirect carrying `next` and the
//!   status flag

use async_trait::async_trait;
use reqwest::{Client, Url};
use timeout_api::SignOutReason;
use timeout_config::ServiceConfig;
use timeout_host_api::{sign_in_location, HostError, HostResult, SessionHost};
use tracing::{debug, info};

/// Session host backed by the web application's HTTP endpoints
pub struct HttpHost {
    client: Client,
    sign_out_url: Url,
    sign_in_path: String,
}

impl HttpHost {
    pub fn new(config: &ServiceConfig) -> HostResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| HostError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let sign_out_url = base_url
            .join(&config.sign_out_path)
            .map_err(|e| HostError::InvalidUrl(format!("{}: {}", config.sign_out_path, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(|e| HostError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            sign_out_url,
            sign_in_path: config.sign_in_path.clone(),
        })
    }

    pub fn sign_out_url(&self) -> &Url {
        &self.sign_out_url
    }
}

#[async_trait]
impl SessionHost for HttpHost {
    async fn sign_out(&self) -> HostResult<()> {
        debug!(url = %self.sign_out_url, "Requesting sign-out");

        let response = self
            .client
            .get(self.sign_out_url.clone())
            .send()
            .await
            .map_err(|e| HostError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Status {
                status: status.as_u16(),
                url: self.sign_out_url.to_string(),
            });
        }

        info!(url = %self.sign_out_url, status = %status, "Server session signed out");
        Ok(())
    }

    fn sign_in_location(&self, next: &str, reason: SignOutReason) -> HostResult<String> {
        Ok(sign_in_location(&self.sign_in_path, next, reason))
    }
}
