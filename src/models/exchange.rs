use std::time::Duration;
use crate::errors::StepFailure;
use crate::template::HttpMethod;

/// A fully resolved request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// What came back for one request, including the measured round-trip latency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub latency: Duration,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Response or failure of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    Response(HttpResponse),
    Failed(StepFailure),
}

impl StepResult {
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            StepResult::Response(r) => Some(r),
            StepResult::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match self {
            StepResult::Response(_) => None,
            StepResult::Failed(f) => Some(f),
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
