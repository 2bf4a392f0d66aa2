//! # canary-client: Typed Client for Canary Servers
//!
//! Wraps the server's wire protocol:
//!
//! | Method | Path      | Operation                                    |
//! |--------|-----------|----------------------------------------------|
//! | GET    | `/latest` | Latest proof text (204 when none yet)        |
//! | POST   | `/submit` | Submit a proof as form field `proof`         |
//! | GET    | `/status` | [`StatusReport`] JSON                        |
//! | GET    | `/key`    | Hex public key submissions are checked with  |
//!
//! Requests can be routed through a SOCKS5 proxy (e.g. Tor). The client
//! never interprets proofs; verification is the caller's job.

pub mod config;
pub mod error;

pub use config::{endpoint_url, parse_address, ClientConfig};
pub use error::RemoteError;

use std::time::Duration;

use canary_core::StatusReport;
use serde::Deserialize;

/// Form field carrying the proof on submission.
pub const SUBMIT_FIELD: &str = "proof";

/// Client for one canary server.
#[derive(Debug, Clone)]
pub struct CanaryClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl CanaryClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(proxy) = &config.proxy {
            let proxy_cfg =
                reqwest::Proxy::all(proxy.as_str()).map_err(|e| RemoteError::InvalidProxy {
                    proxy: proxy.clone(),
                    source: e,
                })?;
            builder = builder.proxy(proxy_cfg);
        }
        let http = builder.build().map_err(|e| RemoteError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Base URL requests are joined onto.
    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Fetch the latest proof. `None` when the server has no canary yet.
    ///
    /// Calls `GET {base}/latest`.
    pub async fn latest(&self) -> Result<Option<String>, RemoteError> {
        let endpoint = "GET /latest";
        let url = config::join_path(&self.base_url, "latest");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let resp = ensure_success(endpoint, resp).await?;
        resp.text()
            .await
            .map(Some)
            .map_err(|e| RemoteError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })
    }

    /// Submit a proof. Succeeds only on 204.
    ///
    /// Calls `POST {base}/submit` with form field [`SUBMIT_FIELD`].
    pub async fn submit(&self, proof: &str) -> Result<(), RemoteError> {
        let endpoint = "POST /submit";
        let url = config::join_path(&self.base_url, "submit");

        let resp = self
            .http
            .post(url)
            .form(&[(SUBMIT_FIELD, proof)])
            .send()
            .await
            .map_err(|e| RemoteError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if resp.status() != reqwest::StatusCode::NO_CONTENT {
            return Err(api_error(endpoint, resp).await);
        }
        tracing::debug!("proof accepted by server");
        Ok(())
    }

    /// Fetch server status.
    ///
    /// Calls `GET {base}/status`.
    pub async fn status(&self) -> Result<StatusReport, RemoteError> {
        let endpoint = "GET /status";
        let url = config::join_path(&self.base_url, "status");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let resp = ensure_success(endpoint, resp).await?;
        resp.json().await.map_err(|e| RemoteError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }

    /// Fetch the server's public key text.
    ///
    /// Calls `GET {base}/key`.
    pub async fn key(&self) -> Result<String, RemoteError> {
        let endpoint = "GET /key";
        let url = config::join_path(&self.base_url, "key");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RemoteError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let resp = ensure_success(endpoint, resp).await?;
        resp.text().await.map_err(|e| RemoteError::Deserialization {
            endpoint: endpoint.into(),
            source: e,
        })
    }
}

/// Shape of the server's JSON error body.
#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

async fn ensure_success(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(api_error(endpoint, resp).await)
    }
}

async fn api_error(endpoint: &str, resp: reqwest::Response) -> RemoteError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    RemoteError::ApiError {
        endpoint: endpoint.into(),
        status,
        message,
    }
}
