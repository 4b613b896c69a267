use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_THREADS: usize = 10;

/// Scan-wide settings shared read-only by every probe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Worker-pool size: the number of probes allowed in flight at once.
    pub threads: usize,
    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Headers sent with every request unless a step overrides them.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            timeout: None,
            headers: BTreeMap::new(),
            proxy: None,
        }
    }
}

impl ScanConfig {
    pub fn request_timeout(&self) -> Duration {
        self.timeout
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Same proxy endpoint for both schemes.
    pub fn both(url: &str) -> Self {
        Self {
            http: Some(url.to_string()),
            https: Some(url.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.http.as_deref().map_or(true, str::is_empty)
            && self.https.as_deref().map_or(true, str::is_empty)
    }
}
