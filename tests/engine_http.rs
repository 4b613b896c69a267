use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use rwscan::config::ScanConfig;
use rwscan::engine::{HttpTransport, ReqwestTransport, ScanCoordinator, StepExecutor};
use rwscan::errors::{StepFailure, TransportError};
use rwscan::models::{ProbeResult, Verdict};
use rwscan::template::{parse_template_str, Template};
use tokio::sync::mpsc;
use wiremock::{
    matchers::{body_string, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn template(yaml: &str) -> Arc<Template> {
    Arc::new(parse_template_str(yaml, "test", None).unwrap())
}

async fn probe(config: ScanConfig, template: Arc<Template>, url: &str) -> ProbeResult {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(&config).unwrap());
    StepExecutor::new(Arc::new(config), transport).run(template, url).await
}

#[tokio::test]
async fn test_get_body_sent_as_query_and_word_matches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<title>Admin Console</title>"))
        .expect(1)
        .mount(&server)
        .await;

    let t = template(r#"
id: admin-console
http:
  - method: GET
    path: ["{{BaseURL}}/search"]
    body: "q=admin"
    matchers:
      - type: word
        words: ["Admin Console"]
"#);
    let result = probe(ScanConfig::default(), t, &server.uri()).await;
    assert_eq!(result.verdict, Verdict::Vulnerable);
    assert_eq!(result.steps[0].response().unwrap().status, 200);
}

#[tokio::test]
async fn test_post_body_and_header_overlay() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/exec"))
        .and(body_string("{\"cmd\":\"id\"}"))
        .and(header("user-agent", "step-agent"))
        .and(header("x-scanner", "rwscan"))
        .respond_with(ResponseTemplate::new(200).set_body_string("uid=0(root) gid=0(root)"))
        .mount(&server)
        .await;

    let mut headers = BTreeMap::new();
    headers.insert("User-Agent".to_string(), "config-agent".to_string());
    headers.insert("X-Scanner".to_string(), "rwscan".to_string());
    let config = ScanConfig { headers, ..Default::default() };

    let t = template(r#"
http:
  - method: POST
    path: "{{BaseURL}}/api/exec"
    body: '{"cmd":"id"}'
    Rheader:
      - "user-agent: step-agent"
    condition: and
    matchers:
      - type: word
        words: ["uid=0", "gid=0"]
      - type: status
        status: [200]
"#);
    let result = probe(config, t, &server.uri()).await;
    assert_eq!(result.verdict, Verdict::Vulnerable);
    let sent = result.steps[0].request.as_ref().unwrap();
    assert_eq!(sent.header("User-Agent"), Some("step-agent"));
}

#[tokio::test]
async fn test_redirect_status_is_observable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manager/html"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
        .mount(&server)
        .await;

    let t = template(r#"
http:
  - path: "{{BaseURL}}/manager/html"
    matchers:
      - type: status
        status: [302]
"#);
    let result = probe(ScanConfig::default(), t, &server.uri()).await;
    assert_eq!(result.verdict, Verdict::Vulnerable);
}

#[tokio::test]
async fn test_word_mismatch_is_not_vulnerable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nothing to see"))
        .mount(&server)
        .await;

    let t = template(r#"
http:
  - path: "{{BaseURL}}/"
    matchers:
      - type: word
        words: ["root:x:0:0"]
"#);
    let result = probe(ScanConfig::default(), t, &server.uri()).await;
    assert_eq!(result.verdict, Verdict::NotVulnerable);
}

#[tokio::test]
async fn test_time_matcher_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sleep"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(700)))
        .mount(&server)
        .await;

    let t = template(r#"
http:
  - path: "{{BaseURL}}/sleep"
    matchers:
      - type: time
        gt: 0.5
"#);
    let result = probe(ScanConfig::default(), t, &server.uri()).await;
    assert_eq!(result.verdict, Verdict::Vulnerable);
    assert!(result.steps[0].latency().unwrap() >= Duration::from_millis(500));
}

#[tokio::test]
async fn test_timeout_is_recorded_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = ScanConfig { timeout: Some(0.3), ..Default::default() };
    let t = template(r#"
http:
  - path: "{{BaseURL}}/"
    matchers:
      - type: status
        status: [200]
"#);
    let result = probe(config, t, &server.uri()).await;
    assert!(result.verdict.is_error());
    assert!(matches!(
        result.steps[0].failure(),
        Some(StepFailure::Transport(TransportError::Timeout(_)))
    ));
    assert!(result.verdict.to_string().contains("Timeout"));
}

#[tokio::test]
async fn test_unreachable_host_is_error_verdict() {
    let t = template(r#"
http:
  - path: "{{BaseURL}}/"
    matchers:
      - type: status
        status: [200]
"#);
    let config = ScanConfig { timeout: Some(2.0), ..Default::default() };
    let result = probe(config, t, "http://127.0.0.1:1").await;
    assert!(result.verdict.is_error());
    assert_eq!(result.responded_steps(), 0);
}

#[tokio::test]
async fn test_chain_with_failing_second_step() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("uploaded"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shell.jsp"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let t = template(r#"
http:
  - method: POST
    path: "{{BaseURL}}/upload"
    body: "file=shell.jsp"
    matchers:
      - type: word
        words: ["uploaded"]
  - path: "{{BaseURL}}/shell.jsp"
    matchers:
      - type: status
        status: [200]
"#);
    let result = probe(ScanConfig::default(), t, &server.uri()).await;
    assert_eq!(result.verdict, Verdict::NotVulnerable);
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.responded_steps(), 2);
}

#[tokio::test]
async fn test_coordinator_cross_product_against_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("admin"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/debug"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let templates = vec![
        template("id: admin\nhttp:\n  - path: '{{BaseURL}}/admin'\n    matchers:\n      - type: word\n        words: [admin]\n"),
        template("id: debug\nhttp:\n  - path: '{{BaseURL}}/debug'\n    matchers:\n      - type: status\n        status: [200]\n"),
        template("id: bare\nhttp:\n  - path: '{{BaseURL}}/admin'\n"),
    ];
    let urls = vec![server.uri(), format!("{}/", server.uri()), server.uri()];

    let config = Arc::new(ScanConfig { threads: 4, ..Default::default() });
    let transport = Arc::new(ReqwestTransport::new(&config).unwrap());
    let coordinator = ScanCoordinator::new(config, transport);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = coordinator.run_streaming(&templates, &urls, tx).await;

    assert_eq!(outcome.results.len(), 9);
    assert_eq!(outcome.total_pairs, 9);
    let counts = outcome.count_by_verdict();
    // The trailing-slash target requests "//admin", which the mock does not serve.
    assert_eq!(counts.get("vulnerable"), Some(&2));
    assert_eq!(counts.get("not-vulnerable"), Some(&4));
    assert_eq!(counts.get("inconclusive"), Some(&3));

    let mut streamed = 0;
    while rx.recv().await.is_some() {
        streamed += 1;
    }
    assert_eq!(streamed, 9);
}
