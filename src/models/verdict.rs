use serde::{Serialize, Serializer};
use std::fmt;

/// Final classification of one (template, URL) probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Every scored step matched.
    Vulnerable,
    /// At least one scored step did not match.
    NotVulnerable,
    /// Steps ran but none carried matchers, so there was nothing to decide on.
    NoRule,
    /// No step produced a response.
    Error(String),
}

impl Verdict {
    /// Only `Vulnerable` results are handed to reporting sinks.
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Verdict::Vulnerable)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Verdict::Error(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Vulnerable => "vulnerable",
            Verdict::NotVulnerable => "not-vulnerable",
            Verdict::NoRule => "inconclusive",
            Verdict::Error(_) => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Error(reason) => write!(f, "error:{}", reason),
            other => f.write_str(other.label()),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-step outcome of applying a step's condition to its matchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepEvaluation {
    Matched,
    NotMatched,
    /// The step has no matchers.
    NoRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Vulnerable.to_string(), "vulnerable");
        assert_eq!(Verdict::NotVulnerable.to_string(), "not-vulnerable");
        assert_eq!(Verdict::NoRule.to_string(), "inconclusive");
        assert_eq!(Verdict::Error("step 1: Timeout".into()).to_string(), "error:step 1: Timeout");
    }

    #[test]
    fn test_only_vulnerable_is_reportable() {
        assert!(Verdict::Vulnerable.is_vulnerable());
        assert!(!Verdict::NoRule.is_vulnerable());
        assert!(!Verdict::Error("x".into()).is_vulnerable());
        assert!(Verdict::Error("x".into()).is_error());
    }

    #[test]
    fn test_verdict_serializes_as_string() {
        let json = serde_json::to_string(&Verdict::NoRule).unwrap();
        assert_eq!(json, "\"inconclusive\"");
        let json = serde_json::to_string(&StepEvaluation::NotMatched).unwrap();
        assert_eq!(json, "\"not-matched\"");
    }
}
