use reqwest::Url;
use crate::utils::{truncate_error, truncate_prefix, BODY_PREVIEW_CHARS};
use super::exchange::{HttpResponse, PreparedRequest};
use super::probe::StepRecord;

/// HTTP/1.1-style text view of a prepared request.
pub struct RequestSnapshot<'a>(pub &'a PreparedRequest);

impl RequestSnapshot<'_> {
    pub fn render(&self) -> String {
        let request = self.0;
        let parsed = Url::parse(&request.url).ok();
        let target = parsed.as_ref()
            .map(|u| match u.query() {
                Some(q) => format!("{}?{}", u.path(), q),
                None => u.path().to_string(),
            })
            .unwrap_or_else(|| request.url.clone());

        let mut out = format!("{} {} HTTP/1.1\n", request.method, target);
        if request.header("host").is_none() {
            if let Some(host) = parsed.as_ref().and_then(host_header) {
                out.push_str(&format!("Host: {}\n", host));
            }
        }
        for (name, value) in &request.headers {
            out.push_str(&format!("{}: {}\n", name, value));
        }
        if let Some(body) = &request.body {
            out.push('\n');
            out.push_str(body);
        }
        out
    }
}

/// HTTP/1.1-style text view of a response with the body cut to a preview.
pub struct ResponseSnapshot<'a>(pub &'a HttpResponse);

impl ResponseSnapshot<'_> {
    pub fn render(&self) -> String {
        let response = self.0;
        let reason = reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        let mut out = format!("HTTP/1.1 {} {}\n", response.status, reason).trim_end().to_string();
        out.push('\n');
        for (name, value) in &response.headers {
            out.push_str(&format!("{}: {}\n", name, value));
        }
        out.push('\n');
        out.push_str(&truncate_prefix(&response.body, BODY_PREVIEW_CHARS));
        out
    }
}

impl StepRecord {
    pub fn request_text(&self) -> Option<String> {
        self.request.as_ref().map(|r| RequestSnapshot(r).render())
    }

    /// The response snapshot, or the failure reason when there was no response.
    pub fn response_text(&self) -> String {
        match (self.response(), self.failure()) {
            (Some(response), _) => ResponseSnapshot(response).render(),
            (None, Some(failure)) => truncate_error(&format!("{}: {}", failure.kind(), failure)),
            (None, None) => String::new(),
        }
    }
}

fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::errors::{StepFailure, TransportError};
    use crate::models::StepResult;
    use crate::template::HttpMethod;

    fn request(url: &str, headers: &[(&str, &str)], body: Option<&str>) -> PreparedRequest {
        PreparedRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: body.map(str::to_string),
        }
    }

    #[test]
    fn test_request_render_adds_host() {
        let req = request("http://10.0.0.5:8080/api/exec?x=1", &[("Content-Type", "text/plain")], Some("id"));
        let text = RequestSnapshot(&req).render();
        assert_eq!(
            text,
            "POST /api/exec?x=1 HTTP/1.1\nHost: 10.0.0.5:8080\nContent-Type: text/plain\n\nid"
        );
    }

    #[test]
    fn test_request_render_keeps_explicit_host() {
        let req = request("https://a.example/", &[("Host", "b.example")], None);
        let text = RequestSnapshot(&req).render();
        assert_eq!(text, "POST / HTTP/1.1\nHost: b.example\n");
    }

    #[test]
    fn test_unparseable_url_rendered_verbatim() {
        let req = request("not a url", &[], None);
        assert_eq!(RequestSnapshot(&req).render(), "POST not a url HTTP/1.1\n");
    }

    #[test]
    fn test_response_render_truncates_body() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Server".into(), "nginx".into())],
            body: "x".repeat(BODY_PREVIEW_CHARS + 1),
            latency: Duration::from_millis(3),
        };
        let text = ResponseSnapshot(&response).render();
        assert!(text.starts_with("HTTP/1.1 200 OK\nServer: nginx\n\n"));
        assert!(text.ends_with("x..."));
    }

    #[test]
    fn test_unknown_status_has_no_reason() {
        let response = HttpResponse { status: 599, headers: vec![], body: String::new(), latency: Duration::ZERO };
        assert_eq!(ResponseSnapshot(&response).render(), "HTTP/1.1 599\n\n");
    }

    #[test]
    fn test_failed_step_text() {
        let record = StepRecord {
            index: 0,
            request: None,
            result: StepResult::Failed(StepFailure::Transport(TransportError::Connection("refused".into()))),
            evaluation: None,
        };
        assert!(record.request_text().is_none());
        assert_eq!(record.response_text(), "ConnectionError: connection error: refused");
    }
}
