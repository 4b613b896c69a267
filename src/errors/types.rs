use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed template {source_name}: {reason}")]
    MalformedTemplate { source_name: String, reason: String },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanError::MalformedTemplate {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single outbound request. Recorded in the probe result,
/// never raised past the step executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "Timeout",
            TransportError::Connection(_) => "ConnectionError",
            TransportError::Tls(_) => "TLSError",
            TransportError::Other(_) => "TransportError",
        }
    }

    /// Map a reqwest failure onto the transport taxonomy.
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(timeout);
        }
        let chain = error_chain(err);
        let tls = causes(err).any(|cause| looks_like_tls(&cause.to_string()));
        if tls {
            TransportError::Tls(chain)
        } else if err.is_connect() {
            TransportError::Connection(chain)
        } else {
            TransportError::Other(chain)
        }
    }
}

/// Why a step produced no response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepFailure {
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl StepFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            StepFailure::UnsupportedMethod(_) => "UnsupportedMethod",
            StepFailure::Transport(t) => t.kind(),
        }
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !parts.contains(&text) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}

/// The source chain below `err`. reqwest's own message carries the request
/// URL, so only the causes are inspected for TLS markers.
fn causes<'a>(
    err: &'a (dyn std::error::Error + 'static),
) -> impl Iterator<Item = &'a (dyn std::error::Error + 'static)> {
    std::iter::successors(err.source(), |&cause| cause.source())
}

fn looks_like_tls(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["tls", "ssl", "certificate", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kinds() {
        assert_eq!(TransportError::Timeout(Duration::from_secs(10)).kind(), "Timeout");
        assert_eq!(TransportError::Connection("refused".into()).kind(), "ConnectionError");
        assert_eq!(TransportError::Tls("bad cert".into()).kind(), "TLSError");
        assert_eq!(TransportError::Other("boom".into()).kind(), "TransportError");
    }

    #[test]
    fn test_step_failure_kind_delegates() {
        let f = StepFailure::from(TransportError::Connection("refused".into()));
        assert_eq!(f.kind(), "ConnectionError");
        assert_eq!(StepFailure::UnsupportedMethod("PUT".into()).kind(), "UnsupportedMethod");
    }

    #[test]
    fn test_looks_like_tls() {
        assert!(looks_like_tls("invalid peer certificate: UnknownIssuer"));
        assert!(looks_like_tls("TLS handshake eof"));
        assert!(!looks_like_tls("Connection refused (os error 111)"));
    }

    #[derive(Debug, Error)]
    #[error("error sending request for url (https://vpn.example/ssl-login)")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("tcp connect error: Connection refused (os error 111)")]
    struct Inner;

    #[test]
    fn test_causes_skip_top_level_message() {
        let err = Outer(Inner);
        let seen: Vec<String> = causes(&err).map(|c| c.to_string()).collect();
        assert_eq!(seen, vec!["tcp connect error: Connection refused (os error 111)".to_string()]);
        assert!(!causes(&err).any(|c| looks_like_tls(&c.to_string())));
        assert!(error_chain(&err).starts_with("error sending request"));
    }

    #[test]
    fn test_malformed_display() {
        let err = ScanError::malformed("poc.yaml", "missing path");
        assert_eq!(err.to_string(), "Malformed template poc.yaml: missing path");
    }
}
