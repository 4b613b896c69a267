use std::time::{Duration, Instant};
use async_trait::async_trait;
use reqwest::{Client, Method};
use crate::config::ScanConfig;
use crate::errors::{ScanError, TransportError};
use crate::models::{HttpResponse, PreparedRequest};
use crate::template::HttpMethod;
use tracing::debug;

/// The one outbound network call a step makes.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, TransportError>;

    /// Transport name for logging
    fn name(&self) -> &str;
}

/// reqwest-backed transport sharing one connection pool across all probes.
///
/// Certificate validation is off: targets are arbitrary hosts, often with
/// self-signed certificates. Redirects are not followed so 3xx statuses stay
/// visible to status matchers.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let timeout = config.request_timeout();
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout);

        if let Some(proxy) = &config.proxy {
            if let Some(http) = proxy.http.as_deref().filter(|p| !p.is_empty()) {
                let p = reqwest::Proxy::http(http)
                    .map_err(|e| ScanError::Config(format!("Invalid http proxy {}: {}", http, e)))?;
                builder = builder.proxy(p);
            }
            if let Some(https) = proxy.https.as_deref().filter(|p| !p.is_empty()) {
                let p = reqwest::Proxy::https(https)
                    .map_err(|e| ScanError::Config(format!("Invalid https proxy {}: {}", https, e)))?;
                builder = builder.proxy(p);
            }
        }

        let client = builder.build()
            .map_err(|e| ScanError::Http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        let method = match &request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Other(name) => Method::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Other(format!("invalid method {}: {}", name, e)))?,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let response = builder.send().await
            .map_err(|e| TransportError::from_reqwest(&e, self.timeout))?;

        let status = response.status().as_u16();
        let headers = response.headers().iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response.text().await
            .map_err(|e| TransportError::from_reqwest(&e, self.timeout))?;
        let latency = start.elapsed();

        debug!(url = %request.url, status, latency_ms = latency.as_millis() as u64, "Received response");

        Ok(HttpResponse { status, headers, body, latency })
    }

    fn name(&self) -> &str { "reqwest" }
}
