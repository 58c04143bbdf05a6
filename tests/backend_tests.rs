/// Integration tests for the HTTP backend client.
///
/// Each test starts a `tiny_http` stub on an ephemeral port, points an
/// [`HttpBackend`] at it and inspects what arrived on the wire. Request
/// logging is off for clients built with `HttpBackend::new`, so nothing is
/// written to the home directory.
use std::io::Read;
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use dqai::backend::{
    AnalysisBackend, BackendError, CHAT_FALLBACK, FIX_FALLBACK, HttpBackend, Insights,
};
use dqai::profile::GovernanceProfile;
use dqai::session::{Dashboard, Screen};
use dqai::upload::DatasetFile;
use tiny_http::{Header, Response, Server, StatusCode};

// ---------------------------------------------------------------------------
// Stub server
// ---------------------------------------------------------------------------

/// One request as the stub saw it.
#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Start a stub answering every request with `handler(path)`.
fn stub<F>(handler: F) -> (String, Receiver<Captured>)
where
    F: Fn(&str) -> (u16, String) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = Vec::new();
            let _ = request.as_reader().read_to_end(&mut body);
            let content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.as_str().to_string());
            let path = request.url().to_string();
            let (status, reply) = handler(&path);

            let _ = tx.send(Captured {
                method: request.method().to_string(),
                path,
                content_type,
                body,
            });

            let response = Response::from_string(reply)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json").unwrap(),
                )
                .with_status_code(StatusCode(status));
            let _ = request.respond(response);
        }
    });

    (format!("http://{addr}"), rx)
}

fn next(rx: &Receiver<Captured>) -> Captured {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("stub received no request")
}

/// A base URL nothing listens on.
fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

const ORDERS_RESULT: &str = r#"{
    "dqs": 62,
    "dimensions": {"uniqueness": 40, "completeness": 90},
    "insights": "Customer IDs repeat across rows.",
    "recommendations": ["Dedupe IDs"]
}"#;

// ---------------------------------------------------------------------------
// Evaluate
// ---------------------------------------------------------------------------

#[test]
fn evaluate_sends_multipart_file_and_context() {
    let (url, rx) = stub(|_| (200, ORDERS_RESULT.to_string()));
    let backend = HttpBackend::new(&url);
    let file = DatasetFile::new("orders.csv", b"id,amount\n1,10\n".to_vec());

    let result = backend.evaluate(&file, GovernanceProfile::Fraud).unwrap();

    let req = next(&rx);
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/evaluate");
    let content_type = req.content_type.unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let body = String::from_utf8(req.body).unwrap();
    assert!(body.contains(r#"Content-Disposition: form-data; name="file"; filename="orders.csv""#));
    assert!(body.contains("Content-Type: text/csv"));
    assert!(body.contains("id,amount\n1,10\n"));
    assert!(body.contains("Content-Disposition: form-data; name=\"context\"\r\n\r\nfraud\r\n"));

    assert_eq!(result.dqs, 62.0);
    let names: Vec<&str> = result.dimensions.keys().map(String::as_str).collect();
    assert_eq!(names, ["completeness", "uniqueness"]);
    assert_eq!(
        result.insights,
        Insights::Text("Customer IDs repeat across rows.".into())
    );
    assert_eq!(result.recommendations, ["Dedupe IDs"]);
}

#[test]
fn evaluate_accepts_structured_insights() {
    let (url, _rx) = stub(|_| {
        (
            200,
            r#"{"dqs": 81.5, "dimensions": {}, "insights": {"summary": "ok"}, "recommendations": []}"#
                .to_string(),
        )
    });
    let backend = HttpBackend::new(&url);

    let result = backend
        .evaluate(&DatasetFile::new("a.csv", Vec::new()), GovernanceProfile::Kyc)
        .unwrap();

    assert_eq!(result.dqs, 81.5);
    assert_eq!(result.insights.display_text(), r#"{"summary":"ok"}"#);
}

#[test]
fn evaluate_error_status_propagates() {
    let (url, _rx) = stub(|_| (500, r#"{"error": "scoring failed"}"#.to_string()));
    let backend = HttpBackend::new(&url);

    let err = backend
        .evaluate(&DatasetFile::new("a.csv", Vec::new()), GovernanceProfile::Analytics)
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("scoring failed"));
}

#[test]
fn evaluate_malformed_body_is_a_decode_error() {
    let (url, _rx) = stub(|_| (200, r#"{"score": 10}"#.to_string()));
    let backend = HttpBackend::new(&url);

    let err = backend
        .evaluate(&DatasetFile::new("a.csv", Vec::new()), GovernanceProfile::Analytics)
        .unwrap_err();

    assert!(matches!(err, BackendError::Decode(_)));
}

// ---------------------------------------------------------------------------
// Fix and chat
// ---------------------------------------------------------------------------

#[test]
fn fix_and_chat_post_json() {
    let (url, rx) = stub(|path| match path {
        "/fix" => (200, r#"{"fix": "Drop duplicates\nKeep the latest row"}"#.to_string()),
        "/chat" => (200, r#"{"reply": "Uniqueness is low."}"#.to_string()),
        _ => (404, "{}".to_string()),
    });
    let backend = HttpBackend::new(&url);

    assert_eq!(
        backend.fetch_fix_suggestion("Dedupe IDs"),
        "Drop duplicates\nKeep the latest row"
    );
    let req = next(&rx);
    assert_eq!(req.path, "/fix");
    assert!(req.content_type.unwrap().starts_with("application/json"));
    let sent: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(sent, serde_json::json!({ "issue": "Dedupe IDs" }));

    assert_eq!(backend.send_chat_message("why 62?"), "Uniqueness is low.");
    let req = next(&rx);
    assert_eq!(req.path, "/chat");
    let sent: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(sent, serde_json::json!({ "message": "why 62?" }));
}

#[test]
fn server_errors_become_fallback_strings() {
    let (url, _rx) = stub(|_| (500, "{}".to_string()));
    let backend = HttpBackend::new(&url);

    assert_eq!(backend.fetch_fix_suggestion("Dedupe IDs"), FIX_FALLBACK);
    assert_eq!(backend.send_chat_message("hello"), CHAT_FALLBACK);
}

#[test]
fn unreachable_backend() {
    let backend = HttpBackend::new(&dead_url());

    assert!(!backend.is_reachable());
    assert_eq!(backend.fetch_fix_suggestion("Dedupe IDs"), FIX_FALLBACK);
    assert_eq!(backend.send_chat_message("hello"), CHAT_FALLBACK);

    let err = backend
        .evaluate(&DatasetFile::new("a.csv", Vec::new()), GovernanceProfile::Analytics)
        .unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
    assert_eq!(err.status(), None);
}

#[test]
fn any_http_answer_counts_as_reachable() {
    let (url, _rx) = stub(|_| (404, "{}".to_string()));
    assert!(HttpBackend::new(&url).is_reachable());
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn dashboard_over_http_fetches_each_fix_once() {
    let (url, rx) = stub(|path| match path {
        "/evaluate" => (200, ORDERS_RESULT.to_string()),
        "/fix" => (200, r#"{"fix": "Drop duplicates"}"#.to_string()),
        _ => (404, "{}".to_string()),
    });
    let backend = HttpBackend::new(&url);
    let mut dash = Dashboard::default();
    dash.select_file(DatasetFile::new("orders.csv", b"id\n1\n1\n".to_vec()))
        .unwrap();

    dash.analyze(&backend, Some(GovernanceProfile::Fraud)).unwrap();
    assert_eq!(dash.screen(), Screen::Results);

    for _ in 0..4 {
        dash.toggle_recommendation_with(&backend, 0).unwrap();
    }

    let paths: Vec<String> = rx.try_iter().map(|c| c.path).collect();
    assert_eq!(paths, ["/evaluate", "/fix"]);
}
