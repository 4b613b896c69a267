use std::path::Path;
use crate::errors::ScanError;
use super::types::ScanConfig;
use tracing::{debug, warn};

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<ScanConfig, ScanError> {
    if !path.exists() {
        return Err(ScanError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(ScanError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    debug!(path = %path.display(), threads = config.threads, "Loaded scan config");
    Ok(config)
}

pub fn parse_config_str(content: &str) -> Result<ScanConfig, ScanError> {
    let config: ScanConfig = serde_yaml::from_str(content)
        .map_err(|e| ScanError::Config(format!("Invalid config: {}", e)))?;
    validate_config(&config)?;
    Ok(config)
}

/// Reject values that would make the worker pool or request timeout meaningless.
pub fn validate_config(config: &ScanConfig) -> Result<(), ScanError> {
    if config.threads == 0 {
        return Err(ScanError::Config("threads must be a positive integer".into()));
    }

    if let Some(timeout) = config.timeout {
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ScanError::Config(format!(
                "timeout must be a positive number of seconds, got {}",
                timeout
            )));
        }
    }

    for name in config.headers.keys() {
        if name.trim().is_empty() {
            return Err(ScanError::Config("header names must not be empty".into()));
        }
    }

    if let Some(proxy) = &config.proxy {
        if proxy.is_empty() {
            warn!("Proxy section present but no endpoints configured");
        }
    }

    Ok(())
}
