/// Client side of the analysis backend contract.
///
/// Three request types travel to the backend:
///
/// - **Evaluate** (`POST /evaluate`, multipart): the primary flow. Failures
///   propagate to the caller, which shows a blocking notice.
/// - **Fix** (`POST /fix`) and **Chat** (`POST /chat`): assistive flows.
///   Failures are swallowed here and replaced by a fixed apology string so
///   the surrounding view never breaks on them.
///
/// Nothing is retried. The [`AnalysisBackend`] trait is the seam between the
/// state machines and the transport; [`http::HttpBackend`] is the real
/// implementation.
pub mod http;
pub mod multipart;
pub mod types;

pub use http::HttpBackend;
pub use types::{AnalysisResult, Insights};

use crate::profile::GovernanceProfile;
use crate::upload::DatasetFile;

/// Shown in place of a fix suggestion when the fix request fails.
pub const FIX_FALLBACK: &str = "Unable to connect to AI for help.";

/// Shown in place of a chat reply when the chat request fails.
pub const CHAT_FALLBACK: &str = "Error connecting to AI.";

/// Notice shown when an evaluate request fails.
pub const EVALUATE_FAILED_NOTICE: &str = "Backend connection failed.";

/// Transport-level failure of a backend request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request never produced an HTTP response (refused, DNS, timeout).
    #[error("backend unreachable: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body did not match the expected shape.
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl BackendError {
    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The analysis backend as seen by the client.
pub trait AnalysisBackend: Send + Sync {
    /// Upload a dataset for scoring under the given profile.
    fn evaluate(
        &self,
        file: &DatasetFile,
        profile: GovernanceProfile,
    ) -> Result<AnalysisResult, BackendError>;

    /// Ask for remediation steps for one recommendation.
    fn request_fix(&self, issue: &str) -> Result<String, BackendError>;

    /// Send one free-text chat message and return the reply.
    fn request_chat(&self, message: &str) -> Result<String, BackendError>;

    /// Whether the backend answers HTTP at all.
    fn is_reachable(&self) -> bool {
        true
    }

    /// Best-effort fix suggestion: failures become [`FIX_FALLBACK`].
    fn fetch_fix_suggestion(&self, issue: &str) -> String {
        self.request_fix(issue)
            .unwrap_or_else(|_| FIX_FALLBACK.to_string())
    }

    /// Best-effort chat reply: failures become [`CHAT_FALLBACK`].
    fn send_chat_message(&self, message: &str) -> String {
        self.request_chat(message)
            .unwrap_or_else(|_| CHAT_FALLBACK.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl AnalysisBackend for Offline {
        fn evaluate(
            &self,
            _file: &DatasetFile,
            _profile: GovernanceProfile,
        ) -> Result<AnalysisResult, BackendError> {
            Err(BackendError::Transport("connection refused".into()))
        }

        fn request_fix(&self, _issue: &str) -> Result<String, BackendError> {
            Err(BackendError::Status {
                status: 500,
                body: "boom".into(),
            })
        }

        fn request_chat(&self, _message: &str) -> Result<String, BackendError> {
            Err(BackendError::Decode("missing field `reply`".into()))
        }
    }

    #[test]
    fn secondary_requests_degrade_to_fallbacks() {
        assert_eq!(Offline.fetch_fix_suggestion("Dedupe IDs"), FIX_FALLBACK);
        assert_eq!(Offline.send_chat_message("hello"), CHAT_FALLBACK);
    }

    #[test]
    fn evaluate_failure_propagates() {
        let file = DatasetFile::new("a.csv", Vec::new());
        let err = Offline
            .evaluate(&file, GovernanceProfile::Analytics)
            .unwrap_err();
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn status_is_exposed() {
        let err = BackendError::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(502));
    }
}
