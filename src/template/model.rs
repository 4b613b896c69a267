use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use crate::errors::ScanError;
use super::raw::{OneOrMany, RawMatcher, RawStep, RawTemplate};
use tracing::warn;

/// Token in a step path replaced with the literal target URL.
pub const BASE_URL_PLACEHOLDER: &str = "{{BaseURL}}";

/// Severity declared in a template's `info` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    Unknown,
}

impl Severity {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "info" => Severity::Info,
            _ => Severity::Unknown,
        }
    }

    /// Lower values indicate higher severity.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
            Severity::Unknown => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
            Severity::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub severity: Severity,
    pub category: String,
    pub author: Option<String>,
    pub description: Option<String>,
}

/// A validated POC: identifying metadata plus its ordered request steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: String,
    pub info: TemplateInfo,
    pub steps: Vec<Step>,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
    Get,
    Post,
    /// Kept so the failure surfaces per step at run time.
    Other(String),
}

impl HttpMethod {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            other => HttpMethod::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the matcher outcomes of one step are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    And,
    #[default]
    Or,
}

impl Condition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "and" => Some(Condition::And),
            "or" => Some(Condition::Or),
            _ => None,
        }
    }
}

/// One HTTP request definition plus the rules that judge its response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub method: HttpMethod,
    /// Path pattern, normally starting with [`BASE_URL_PLACEHOLDER`].
    pub path: String,
    pub body: Option<String>,
    /// Step-level header overrides in declaration order.
    pub headers: Vec<(String, String)>,
    pub matchers: Vec<Matcher>,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResponsePart {
    Body,
    Other(String),
}

impl ResponsePart {
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized == "body" {
            ResponsePart::Body
        } else {
            ResponsePart::Other(normalized)
        }
    }
}

/// Latency bounds in seconds. Every bound that is present must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimeThreshold {
    pub gt: Option<f64>,
    pub lt: Option<f64>,
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}

impl TimeThreshold {
    fn bounds(&self) -> [Option<f64>; 4] {
        [self.gt, self.lt, self.gte, self.lte]
    }

    pub fn is_empty(&self) -> bool {
        self.bounds().iter().all(Option::is_none)
    }

    pub fn comparator_count(&self) -> usize {
        self.bounds().iter().filter(|b| b.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Matcher {
    /// Every word must appear in the selected response part.
    Word { part: ResponsePart, words: Vec<String> },
    /// Response status must be one of the listed codes.
    Status { codes: Vec<u16> },
    Time(TimeThreshold),
    /// Unrecognized matcher type; always evaluates to false.
    Unsupported { kind: String },
}

impl Template {
    /// Validate a raw template. `source_name` names it in errors; `fallback_category`
    /// is used when `info.category` is absent.
    pub fn from_raw(
        raw: RawTemplate,
        source_name: &str,
        fallback_category: Option<&str>,
    ) -> Result<Self, ScanError> {
        let raw_steps = raw.http
            .filter(|steps| !steps.is_empty())
            .ok_or_else(|| ScanError::malformed(source_name, "template has no http steps"))?;

        let steps = raw_steps.into_iter()
            .enumerate()
            .map(|(i, step)| build_step(step, source_name, i))
            .collect::<Result<Vec<_>, _>>()?;

        let info = raw.info;
        let id = raw.id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| source_name.to_string());
        let name = info.as_ref()
            .and_then(|i| i.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.clone());
        let severity = info.as_ref()
            .and_then(|i| i.severity.as_deref())
            .map(Severity::parse)
            .unwrap_or(Severity::Unknown);
        let category = info.as_ref()
            .and_then(|i| i.category.clone())
            .or_else(|| fallback_category.map(str::to_string))
            .unwrap_or_else(|| "uncategorized".to_string());

        Ok(Template {
            id,
            info: TemplateInfo {
                name,
                severity,
                category,
                author: info.as_ref().and_then(|i| i.author.clone()),
                description: info.and_then(|i| i.description),
            },
            steps,
            source: None,
        })
    }

    pub fn with_source(mut self, path: PathBuf) -> Self {
        self.source = Some(path);
        self
    }

    pub fn matcher_count(&self) -> usize {
        self.steps.iter().map(|s| s.matchers.len()).sum()
    }
}

fn build_step(raw: RawStep, source_name: &str, index: usize) -> Result<Step, ScanError> {
    let at = |reason: String| ScanError::malformed(source_name, format!("step {}: {}", index + 1, reason));

    let mut paths = raw.path
        .map(|p| p.into_vec())
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.trim().is_empty());
    let path = paths.next().ok_or_else(|| at("missing path".into()))?;
    let extra = paths.count();
    if extra > 0 {
        warn!(
            template = %source_name,
            step = index + 1,
            ignored = extra,
            "Only the first path of a step is used"
        );
    }
    if !path.contains(BASE_URL_PLACEHOLDER) {
        warn!(
            template = %source_name,
            step = index + 1,
            path = %path,
            "Step path has no base URL placeholder"
        );
    }

    let method = raw.method
        .and_then(|m| m.into_vec().into_iter().next())
        .map(|m| HttpMethod::parse(&m))
        .unwrap_or(HttpMethod::Get);

    let body = raw.body
        .and_then(|b| b.into_vec().into_iter().next())
        .filter(|b| !b.is_empty());

    let mut headers = Vec::new();
    for line in raw.header_lines.map(|h| h.into_vec()).unwrap_or_default() {
        let (name, value) = line.split_once(':')
            .ok_or_else(|| at(format!("header line without ':': {}", line)))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }
    for (name, value) in raw.headers.unwrap_or_default() {
        let value = yaml_scalar_to_string(&value)
            .ok_or_else(|| at(format!("header {} must be a scalar", name)))?;
        headers.push((name.trim().to_string(), value));
    }
    if headers.iter().any(|(name, _)| name.is_empty()) {
        return Err(at("empty header name".into()));
    }

    let condition = match raw.condition.as_deref() {
        None => Condition::default(),
        Some(value) => Condition::parse(value)
            .ok_or_else(|| at(format!("unknown condition: {}", value)))?,
    };

    let matchers = raw.matchers.into_iter()
        .enumerate()
        .map(|(m, matcher)| {
            build_matcher(matcher).map_err(|reason| at(format!("matcher {}: {}", m + 1, reason)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Step { method, path, body, headers, matchers, condition })
}

fn build_matcher(raw: RawMatcher) -> Result<Matcher, String> {
    let kind = raw.kind
        .map(|k| k.trim().to_ascii_lowercase())
        .ok_or_else(|| "missing type".to_string())?;

    match kind.as_str() {
        "word" => {
            let words = raw.words
                .map(OneOrMany::into_vec)
                .filter(|w| !w.is_empty())
                .ok_or_else(|| "word matcher requires non-empty words".to_string())?;
            let part = raw.part
                .as_deref()
                .map(ResponsePart::parse)
                .unwrap_or(ResponsePart::Body);
            Ok(Matcher::Word { part, words })
        }
        "status" => {
            let codes = raw.status
                .map(OneOrMany::into_vec)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "status matcher requires non-empty status".to_string())?;
            Ok(Matcher::Status { codes })
        }
        "time" => {
            let threshold = TimeThreshold {
                gt: raw.gt,
                lt: raw.lt,
                gte: raw.gte,
                lte: raw.lte,
            };
            if threshold.is_empty() {
                return Err("time matcher requires one of gt, lt, gte, lte".into());
            }
            if threshold.bounds().iter().flatten().any(|b| !b.is_finite() || *b < 0.0) {
                return Err("time comparator must be a non-negative number".into());
            }
            Ok(Matcher::Time(threshold))
        }
        _ => Ok(Matcher::Unsupported { kind }),
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
