/// HTTP implementation of [`AnalysisBackend`] using the synchronous `ureq`
/// client.
///
/// One agent is built per client and reused for every request. Each request
/// is timed and, when request logging is enabled, appended to the JSONL
/// request log regardless of outcome.
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::multipart::MultipartForm;
use super::types::{AnalysisResult, ChatRequest, ChatResponse, FixRequest, FixResponse};
use super::{AnalysisBackend, BackendError};
use crate::analytics::logger::{self, Operation};
use crate::config::DqaiConfig;
use crate::profile::GovernanceProfile;
use crate::upload::DatasetFile;

/// Timeout for the reachability probe, independent of the request timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct HttpBackend {
    base_url: String,
    timeout: Option<Duration>,
    log_requests: bool,
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Client for `base_url` with no timeout and no request logging.
    pub fn new(base_url: &str) -> Self {
        Self::build(base_url, None, false)
    }

    /// Build a client from the resolved config.
    ///
    /// `backend.timeout_ms = 0` leaves requests without a deadline.
    pub fn from_config(config: &DqaiConfig) -> Self {
        let timeout = match config.backend.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        Self::build(&config.backend.base_url, timeout, config.logging.enabled)
    }

    fn build(base_url: &str, timeout: Option<Duration>, log_requests: bool) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            log_requests,
            agent: builder.build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let resp = self
            .agent
            .post(&self.endpoint(path))
            .send_json(body)
            .map_err(map_ureq_error)?;
        resp.into_json::<R>()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn record<T>(
        &self,
        operation: Operation,
        profile: Option<GovernanceProfile>,
        started: Instant,
        outcome: &Result<T, BackendError>,
    ) {
        if !self.log_requests {
            return;
        }
        let latency_ms = started.elapsed().as_millis() as u64;
        logger::log_request(operation, profile, latency_ms, outcome.as_ref().err());
    }
}

impl AnalysisBackend for HttpBackend {
    fn evaluate(
        &self,
        file: &DatasetFile,
        profile: GovernanceProfile,
    ) -> Result<AnalysisResult, BackendError> {
        let started = Instant::now();

        let (content_type, body) = MultipartForm::new()
            .file("file", &file.name, "text/csv", &file.bytes)
            .text("context", profile.tag())
            .finish();

        let outcome = self
            .agent
            .post(&self.endpoint("/evaluate"))
            .set("Content-Type", &content_type)
            .send_bytes(&body)
            .map_err(map_ureq_error)
            .and_then(|resp| {
                resp.into_json::<AnalysisResult>()
                    .map_err(|e| BackendError::Decode(e.to_string()))
            });

        self.record(Operation::Evaluate, Some(profile), started, &outcome);
        outcome
    }

    fn request_fix(&self, issue: &str) -> Result<String, BackendError> {
        let started = Instant::now();
        let outcome = self
            .post_json::<_, FixResponse>("/fix", &FixRequest { issue })
            .map(|r| r.fix);
        self.record(Operation::Fix, None, started, &outcome);
        outcome
    }

    fn request_chat(&self, message: &str) -> Result<String, BackendError> {
        let started = Instant::now();
        let outcome = self
            .post_json::<_, ChatResponse>("/chat", &ChatRequest { message })
            .map(|r| r.reply);
        self.record(Operation::Chat, None, started, &outcome);
        outcome
    }

    /// Any HTTP answer counts, including 404/405: the backend exposes no
    /// dedicated health route.
    fn is_reachable(&self) -> bool {
        let probe_timeout = self.timeout.map_or(PROBE_TIMEOUT, |t| t.min(PROBE_TIMEOUT));
        match self
            .agent
            .get(&self.endpoint("/"))
            .timeout(probe_timeout)
            .call()
        {
            Ok(_) | Err(ureq::Error::Status(_, _)) => true,
            Err(ureq::Error::Transport(_)) => false,
        }
    }
}

fn map_ureq_error(err: ureq::Error) -> BackendError {
    match err {
        ureq::Error::Status(status, resp) => BackendError::Status {
            status,
            body: resp.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => BackendError::Transport(transport.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let config = DqaiConfig::default();
        let client = HttpBackend::from_config(&config);
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
        assert_eq!(client.timeout, None);
        assert!(client.log_requests);
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = HttpBackend::new("http://127.0.0.1:5000/");
        assert_eq!(client.endpoint("/fix"), "http://127.0.0.1:5000/fix");
    }

    #[test]
    fn nonzero_timeout_is_applied() {
        let mut config = DqaiConfig::default();
        config.backend.timeout_ms = 2500;
        let client = HttpBackend::from_config(&config);
        assert_eq!(client.timeout, Some(Duration::from_millis(2500)));
    }
}
