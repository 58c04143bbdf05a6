//! JSON API handlers for the web dashboard.
//!
//! Handlers return an [`ApiReply`] (status + JSON body); the server turns it
//! into a `tiny_http` response. The dashboard lock is never held while a
//! backend request runs: each handler begins under the lock, releases it for
//! the network call and re-locks to finish.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::backend::EVALUATE_FAILED_NOTICE;
use crate::chat::ChatError;
use crate::config;
use crate::presentation::{ChatView, DashboardView};
use crate::profile::GovernanceProfile;
use crate::session::{DashboardError, FixAction, Submission};
use crate::upload::{DatasetFile, NOT_CSV_WARNING, UploadError};

// ---------------------------------------------------------------------------
// Reply type
// ---------------------------------------------------------------------------

/// Status code plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiReply {
    fn ok<T: Serialize>(data: &T) -> Result<Self> {
        Self::with_status(200, data)
    }

    fn with_status<T: Serialize>(status: u16, data: &T) -> Result<Self> {
        let body = serde_json::to_value(data).context("failed to serialize JSON response")?;
        Ok(Self { status, body })
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message.into() }),
        }
    }

    pub fn not_found() -> Self {
        Self::error(404, "not found")
    }
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    profile: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatPost {
    message: String,
}

/// Health API response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    backend_url: String,
    backend_reachable: bool,
    config_exists: bool,
    log_exists: bool,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    reply: String,
    chat: ChatView,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn state_reply(state: &AppState) -> Result<ApiReply> {
    let dash = state.lock();
    ApiReply::ok(&DashboardView::from_dashboard(&dash))
}

/// Map dashboard errors that are the client's fault to 4xx replies.
fn rejection(err: &DashboardError) -> ApiReply {
    let status = match err {
        DashboardError::AnalysisInFlight
        | DashboardError::StaleTicket
        | DashboardError::NoResult
        | DashboardError::Chat(ChatError::ReplyPending) => 409,
        DashboardError::Panel(_) => 404,
        DashboardError::Upload(_) | DashboardError::Chat(ChatError::EmptyMessage) => 400,
        DashboardError::Evaluate(_) => 502,
    };
    ApiReply::error(status, err.to_string())
}

/// Read one query parameter, percent-decoded. Malformed escapes pass
/// through unchanged.
pub(crate) fn query_param(url: &str, name: &str) -> Option<String> {
    url.split_once('?')?.1.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| {
            let bytes = urlencoding::decode_binary(v.as_bytes());
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/state`: the dashboard view model.
pub fn get_state(state: &AppState) -> Result<ApiReply> {
    state_reply(state)
}

/// `POST /api/file?name=N`: select the raw request body as the dataset.
pub fn post_file(state: &AppState, url: &str, body: Vec<u8>) -> Result<ApiReply> {
    let Some(name) = query_param(url, "name").filter(|n| !n.is_empty()) else {
        return Ok(ApiReply::error(400, "missing 'name' query parameter"));
    };

    let selected = state.lock().select_file(DatasetFile::new(name, body));
    match selected {
        Ok(()) => state_reply(state),
        Err(DashboardError::Upload(err @ UploadError::NotCsv { .. })) => Ok(ApiReply {
            status: 400,
            body: serde_json::json!({
                "error": err.to_string(),
                "warning": NOT_CSV_WARNING,
            }),
        }),
        Err(err) => Ok(rejection(&err)),
    }
}

/// `DELETE /api/file`: drop the selected dataset.
pub fn delete_file(state: &AppState) -> Result<ApiReply> {
    let cleared = state.lock().clear_file();
    match cleared {
        Ok(()) => state_reply(state),
        Err(err) => Ok(rejection(&err)),
    }
}

/// `POST /api/analyze`: evaluate the selected dataset, optionally under a
/// new profile. Without a file only the profile is remembered.
pub fn post_analyze(state: &AppState, body: &[u8]) -> Result<ApiReply> {
    let req: AnalyzeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        AnalyzeRequest::default()
    } else {
        serde_json::from_slice(body).context("invalid JSON in analyze request")?
    };

    let profile = match req.profile.as_deref().map(str::parse::<GovernanceProfile>) {
        None => None,
        Some(Ok(profile)) => Some(profile),
        Some(Err(err)) => return Ok(ApiReply::error(400, err.to_string())),
    };

    let submission = state.lock().begin_analysis(profile);
    let ticket = match submission {
        Ok(Submission::ProfileRemembered) => return state_reply(state),
        Ok(Submission::Started(ticket)) => ticket,
        Err(err) => return Ok(rejection(&err)),
    };

    let outcome = state.backend.evaluate(&ticket.file, ticket.profile);

    let mut dash = state.lock();
    match dash.finish_analysis(ticket, outcome) {
        Ok(()) => ApiReply::ok(&DashboardView::from_dashboard(&dash)),
        Err(DashboardError::Evaluate(err)) => ApiReply::with_status(
            502,
            &serde_json::json!({
                "error": EVALUATE_FAILED_NOTICE,
                "detail": err.to_string(),
                "state": DashboardView::from_dashboard(&dash),
            }),
        ),
        Err(err) => Ok(rejection(&err)),
    }
}

/// `POST /api/reset`: "Analyze Another Dataset".
pub fn post_reset(state: &AppState) -> Result<ApiReply> {
    let reset = state.lock().reset();
    match reset {
        Ok(()) => state_reply(state),
        Err(err) => Ok(rejection(&err)),
    }
}

/// `POST /api/recommendations/{index}/toggle`: open or close one row,
/// fetching its fix on first open.
pub fn post_toggle(state: &AppState, index: usize) -> Result<ApiReply> {
    let action = state.lock().toggle_recommendation(index);
    let pending = match action {
        Ok(FixAction::Settled(_)) => return state_reply(state),
        Ok(FixAction::Fetch(pending)) => pending,
        Err(err) => return Ok(rejection(&err)),
    };

    let text = state.backend.fetch_fix_suggestion(&pending.ticket.issue);

    // A reset in the meantime makes the fix stale; the current view is
    // still the right answer.
    let _ = state.lock().finish_fix(pending, text);
    state_reply(state)
}

/// `GET /api/chat`: the transcript.
pub fn get_chat(state: &AppState) -> Result<ApiReply> {
    let dash = state.lock();
    ApiReply::ok(&DashboardView::from_dashboard(&dash).chat)
}

/// `POST /api/chat`: send one message and wait for the reply.
pub fn post_chat(state: &AppState, body: &[u8]) -> Result<ApiReply> {
    let req: ChatPost = serde_json::from_slice(body).context("invalid JSON in chat request")?;

    let begun = state.lock().begin_chat(&req.message);
    let ticket = match begun {
        Ok(ticket) => ticket,
        Err(err) => return Ok(rejection(&err)),
    };

    let reply = state.backend.send_chat_message(&ticket.message);

    let mut dash = state.lock();
    dash.finish_chat(ticket, reply.clone());
    ApiReply::ok(&ChatReply {
        reply,
        chat: DashboardView::from_dashboard(&dash).chat,
    })
}

/// `GET /api/health`: backend reachability and local file status.
pub fn get_health(state: &AppState) -> Result<ApiReply> {
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let log_exists = crate::analytics::logger::request_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);

    ApiReply::ok(&HealthResponse {
        backend_url: state.backend_url.clone(),
        backend_reachable: state.backend.is_reachable(),
        config_exists,
        log_exists,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(
            query_param("/api/file?name=orders.csv", "name").as_deref(),
            Some("orders.csv")
        );
        assert_eq!(
            query_param("/api/file?x=1&name=a%20b.csv", "name").as_deref(),
            Some("a b.csv")
        );
    }

    #[test]
    fn query_param_missing() {
        assert_eq!(query_param("/api/file", "name"), None);
        assert_eq!(query_param("/api/file?other=1", "name"), None);
    }

    fn name_param(raw: &str) -> String {
        query_param(&format!("/api/file?name={raw}"), "name").unwrap()
    }

    #[test]
    fn query_param_decodes_utf8() {
        assert_eq!(name_param("caf%C3%A9.csv"), "café.csv");
        assert_eq!(name_param("100%25"), "100%");
        assert_eq!(name_param("a%2Bb.csv"), "a+b.csv");
        assert_eq!(name_param("bad%FF.csv"), "bad\u{FFFD}.csv");
    }

    #[test]
    fn malformed_escapes_pass_through() {
        assert_eq!(name_param("a%+1.csv"), "a%+1.csv");
        assert_eq!(name_param("a%-1.csv"), "a%-1.csv");
        assert_eq!(name_param("50%"), "50%");
        assert_eq!(name_param("%zz.csv"), "%zz.csv");
        assert_eq!(name_param("%4"), "%4");
    }

    #[test]
    fn rejection_statuses() {
        assert_eq!(rejection(&DashboardError::AnalysisInFlight).status, 409);
        assert_eq!(
            rejection(&DashboardError::Chat(ChatError::EmptyMessage)).status,
            400
        );
        assert_eq!(rejection(&DashboardError::NoResult).status, 409);
    }

    #[test]
    fn analyze_request_profile_is_optional() {
        let req: AnalyzeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.profile.is_none());
        let req: AnalyzeRequest = serde_json::from_str(r#"{"profile":"kyc"}"#).unwrap();
        assert_eq!(req.profile.as_deref(), Some("kyc"));
    }
}
