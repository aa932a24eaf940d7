//! One classified attempt against the completion API

use super::payload::{ChatCompletionRequest, CompletionResponse};
use crate::config::proxy::ProxySettings;
use crate::error::{RelayError, RelayResult, TransportFailure};
use crate::session::Credential;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, Proxy, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Performs a single call to the completion API.
///
/// Implementations classify every failure into a [`TransportFailure`]. A
/// proxy failure is handled internally by one immediate direct retry and
/// never costs the caller an attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteCallExecutor: Send + Sync {
    async fn execute(
        &self,
        payload: &ChatCompletionRequest,
        credential: &Credential,
        proxy: &ProxySettings,
    ) -> Result<CompletionResponse, TransportFailure>;
}

/// Which client an attempt goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Direct,
    Proxied,
}

/// [`RemoteCallExecutor`] backed by reqwest.
///
/// Keeps one direct client built with an explicit no-proxy setting, plus the
/// most recently used proxied client keyed by the settings it was built for.
pub struct HttpExecutor {
    api_url: String,
    timeout: Duration,
    direct: Client,
    proxied: Mutex<Option<(ProxySettings, Client)>>,
}

impl HttpExecutor {
    /// Create an executor for `api_url` with the given whole-call time bound
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> RelayResult<Self> {
        let api_url = api_url.into();
        let direct = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| RelayError::http_client(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            api_url = %api_url,
            timeout_secs = timeout.as_secs(),
            "created completion executor"
        );

        Ok(Self {
            api_url,
            timeout,
            direct,
            proxied: Mutex::new(None),
        })
    }

    /// Client routed through `proxy`, reusing the cached one when unchanged
    fn proxied_client(&self, proxy: &ProxySettings) -> Result<Client, TransportFailure> {
        let mut cached = self.proxied.lock();
        if let Some((settings, client)) = cached.as_ref() {
            if settings == proxy {
                return Ok(client.clone());
            }
        }

        let proxy_error = |e: reqwest::Error| TransportFailure::Proxy {
            message: format!("invalid proxy configuration: {}", e),
        };

        let mut builder = Client::builder().timeout(self.timeout);
        if let Some(url) = &proxy.http_proxy {
            builder = builder.proxy(Proxy::http(url.as_str()).map_err(proxy_error)?);
        }
        if let Some(url) = &proxy.https_proxy {
            builder = builder.proxy(Proxy::https(url.as_str()).map_err(proxy_error)?);
        }
        let client = builder.build().map_err(proxy_error)?;

        *cached = Some((proxy.clone(), client.clone()));
        Ok(client)
    }

    async fn send(
        &self,
        client: &Client,
        route: Route,
        payload: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<CompletionResponse, TransportFailure> {
        let started = Instant::now();

        let response = client
            .post(&self.api_url)
            .bearer_auth(credential.expose())
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(&e, route))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if route == Route::Proxied && status == StatusCode::PROXY_AUTHENTICATION_REQUIRED {
                return Err(TransportFailure::Proxy {
                    message: format!("proxy rejected the request: {}", status),
                });
            }
            warn!(status = status.as_u16(), body = %body, "completion API returned an error status");
            return Err(TransportFailure::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.classify(&e, route))?;
        let raw = serde_json::from_str(&body).map_err(|e| TransportFailure::MalformedResponse {
            message: format!("response body is not JSON: {}", e),
        })?;

        CompletionResponse::from_json(raw, started.elapsed())
    }

    fn classify(&self, error: &reqwest::Error, route: Route) -> TransportFailure {
        if error.is_timeout() {
            TransportFailure::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else if error.is_connect() && route == Route::Proxied {
            // Through a proxy the TCP/TLS connection is made to the proxy, so a
            // connect failure is the proxy's.
            TransportFailure::Proxy {
                message: error.to_string(),
            }
        } else {
            TransportFailure::Connection {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl RemoteCallExecutor for HttpExecutor {
    #[instrument(skip(self, payload, credential, proxy), fields(messages = payload.messages.len(), proxy = proxy.is_active()))]
    async fn execute(
        &self,
        payload: &ChatCompletionRequest,
        credential: &Credential,
        proxy: &ProxySettings,
    ) -> Result<CompletionResponse, TransportFailure> {
        if !proxy.is_active() {
            debug!("connecting without proxy");
            return self
                .send(&self.direct, Route::Direct, payload, credential)
                .await;
        }

        info!(
            http_proxy = proxy.http_proxy.as_deref().unwrap_or("-"),
            https_proxy = proxy.https_proxy.as_deref().unwrap_or("-"),
            "connecting through proxy"
        );

        let proxied = match self.proxied_client(proxy) {
            Ok(client) => self.send(&client, Route::Proxied, payload, credential).await,
            Err(failure) => Err(failure),
        };

        match proxied {
            Err(TransportFailure::Proxy { message }) => {
                warn!(error = %message, "proxy failed, retrying once without proxy");
                self.send(&self.direct, Route::Direct, payload, credential)
                    .await
            }
            other => other,
        }
    }
}
