//! Application state: upload flow, analysis state machine and chat, composed
//! into one [`Dashboard`] value owned by whichever front end drives it.
//!
//! The analysis lifecycle is an explicit enum:
//!
//! ```text
//! Idle ──submit──▶ Loading ──ok──▶ Ready ──reset──▶ Idle
//!                    │   ▲            │
//!                    │   └──submit────┘   (profile change re-analyses)
//!                    └──err──▶ previous Ready, or Idle
//! ```
//!
//! Requests are split into `begin_*` / `finish_*` halves so a caller can
//! release its lock on the dashboard while the network call runs. Each begin
//! hands out a ticket; a finish with a ticket that no longer matches the
//! current request is refused.

use crate::backend::{AnalysisBackend, AnalysisResult, BackendError};
use crate::chat::{ChatError, ChatSession, ChatTicket};
use crate::profile::GovernanceProfile;
use crate::recommendations::{FixTicket, PanelError, RecommendationPanel, Toggle};
use crate::upload::{DatasetFile, UploadError, UploadFlow};

/// One received result plus the client state that lives and dies with it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub profile: GovernanceProfile,
    pub recommendations: RecommendationPanel,
    generation: u64,
}

impl Analysis {
    fn new(result: AnalysisResult, profile: GovernanceProfile, generation: u64) -> Self {
        let recommendations = RecommendationPanel::new(result.recommendations.clone());
        Self {
            result,
            profile,
            recommendations,
            generation,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum AnalysisState {
    /// No data, nothing in flight.
    #[default]
    Idle,
    /// An evaluate request is running. `previous` is restored if it fails.
    Loading {
        profile: GovernanceProfile,
        previous: Option<Box<Analysis>>,
    },
    /// A result is current.
    Ready(Box<Analysis>),
}

/// Which top-level view the state maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Upload,
    Loading,
    Results,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("an analysis is already in progress")]
    AnalysisInFlight,
    #[error("no analysis result is available")]
    NoResult,
    #[error("response does not belong to the current request")]
    StaleTicket,
    #[error("Backend connection failed. ({0})")]
    Evaluate(#[source] BackendError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// A started evaluate request.
#[derive(Debug)]
pub struct EvaluationTicket {
    generation: u64,
    pub file: DatasetFile,
    pub profile: GovernanceProfile,
}

/// Result of asking for an analysis.
#[derive(Debug)]
pub enum Submission {
    /// No file was present; only the profile was remembered.
    ProfileRemembered,
    /// The dashboard is loading; send the ticket's request.
    Started(EvaluationTicket),
}

/// A started fix request, bound to the analysis it was issued for.
#[derive(Debug)]
pub struct PendingFix {
    generation: u64,
    pub ticket: FixTicket,
}

/// Result of toggling one recommendation row.
#[derive(Debug)]
pub enum FixAction {
    /// Settled locally (collapsed, opened from cache, or disabled).
    Settled(Toggle),
    /// The caller must fetch fix text and hand it to `finish_fix`.
    Fetch(PendingFix),
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    upload: UploadFlow,
    state: AnalysisState,
    chat: ChatSession,
    generation: u64,
}

impl Dashboard {
    pub fn new(profile: GovernanceProfile) -> Self {
        Self {
            upload: UploadFlow::new(profile),
            ..Self::default()
        }
    }

    pub fn upload(&self) -> &UploadFlow {
        &self.upload
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn profile(&self) -> GovernanceProfile {
        self.upload.profile()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, AnalysisState::Loading { .. })
    }

    /// The current result, if the dashboard is showing one.
    pub fn analysis(&self) -> Option<&Analysis> {
        match &self.state {
            AnalysisState::Ready(analysis) => Some(analysis.as_ref()),
            _ => None,
        }
    }

    pub fn screen(&self) -> Screen {
        match self.state {
            AnalysisState::Idle => Screen::Upload,
            AnalysisState::Loading { .. } => Screen::Loading,
            AnalysisState::Ready(_) => Screen::Results,
        }
    }

    /// The profile selector only works with a file and nothing in flight.
    pub fn profile_selector_enabled(&self) -> bool {
        !self.is_loading() && self.upload.has_file()
    }

    pub fn select_file(&mut self, file: DatasetFile) -> Result<(), DashboardError> {
        self.ensure_not_loading()?;
        self.upload.select_file(file)?;
        Ok(())
    }

    pub fn clear_file(&mut self) -> Result<(), DashboardError> {
        self.ensure_not_loading()?;
        self.upload.clear_file();
        Ok(())
    }

    /// Ask for an analysis, optionally switching profile first.
    ///
    /// With no file this only remembers the profile. Otherwise the state
    /// moves to `Loading` and the returned ticket describes the request.
    pub fn begin_analysis(
        &mut self,
        profile: Option<GovernanceProfile>,
    ) -> Result<Submission, DashboardError> {
        self.ensure_not_loading()?;
        let profile = profile.unwrap_or_else(|| self.upload.profile());

        let Some(file) = self.upload.submit(profile) else {
            return Ok(Submission::ProfileRemembered);
        };

        self.generation += 1;
        let previous = match std::mem::take(&mut self.state) {
            AnalysisState::Ready(analysis) => Some(analysis),
            _ => None,
        };
        self.state = AnalysisState::Loading { profile, previous };

        Ok(Submission::Started(EvaluationTicket {
            generation: self.generation,
            file,
            profile,
        }))
    }

    /// Apply the outcome of an evaluate request.
    ///
    /// On failure the previous result comes back if there was one, otherwise
    /// the upload screen with the file still selected. The backend error is
    /// returned for the failure notice.
    pub fn finish_analysis(
        &mut self,
        ticket: EvaluationTicket,
        outcome: Result<AnalysisResult, BackendError>,
    ) -> Result<(), DashboardError> {
        if !self.is_loading() || ticket.generation != self.generation {
            return Err(DashboardError::StaleTicket);
        }
        let previous = match std::mem::take(&mut self.state) {
            AnalysisState::Loading { previous, .. } => previous,
            _ => None,
        };
        self.upload.settle();

        match outcome {
            Ok(result) => {
                self.state = AnalysisState::Ready(Box::new(Analysis::new(
                    result,
                    ticket.profile,
                    ticket.generation,
                )));
                Ok(())
            }
            Err(err) => {
                self.state = match previous {
                    Some(analysis) => AnalysisState::Ready(analysis),
                    None => AnalysisState::Idle,
                };
                Err(DashboardError::Evaluate(err))
            }
        }
    }

    /// Run a full analysis against `backend`. Returns `true` when a request
    /// was made and succeeded, `false` when only the profile was remembered.
    pub fn analyze(
        &mut self,
        backend: &dyn AnalysisBackend,
        profile: Option<GovernanceProfile>,
    ) -> Result<bool, DashboardError> {
        match self.begin_analysis(profile)? {
            Submission::ProfileRemembered => Ok(false),
            Submission::Started(ticket) => {
                let outcome = backend.evaluate(&ticket.file, ticket.profile);
                self.finish_analysis(ticket, outcome)?;
                Ok(true)
            }
        }
    }

    /// "Analyze Another Dataset": drop the result and the file. The profile
    /// and the chat transcript stay.
    pub fn reset(&mut self) -> Result<(), DashboardError> {
        self.ensure_not_loading()?;
        self.state = AnalysisState::Idle;
        self.upload.clear_file();
        Ok(())
    }

    pub fn toggle_recommendation(&mut self, index: usize) -> Result<FixAction, DashboardError> {
        let AnalysisState::Ready(analysis) = &mut self.state else {
            return Err(DashboardError::NoResult);
        };
        match analysis.recommendations.toggle(index)? {
            Toggle::Fetch(ticket) => Ok(FixAction::Fetch(PendingFix {
                generation: analysis.generation,
                ticket,
            })),
            other => Ok(FixAction::Settled(other)),
        }
    }

    /// Store fetched fix text on the analysis it was requested for, whether
    /// that analysis is current or waiting behind a re-analysis.
    pub fn finish_fix(&mut self, pending: PendingFix, text: String) -> Result<(), DashboardError> {
        let analysis = match &mut self.state {
            AnalysisState::Ready(analysis) => Some(analysis),
            AnalysisState::Loading { previous, .. } => previous.as_mut(),
            AnalysisState::Idle => None,
        };
        match analysis {
            Some(analysis) if analysis.generation == pending.generation => {
                analysis.recommendations.finish_fix(pending.ticket, text);
                Ok(())
            }
            _ => Err(DashboardError::StaleTicket),
        }
    }

    /// Toggle a row, fetching its fix from `backend` when needed.
    pub fn toggle_recommendation_with(
        &mut self,
        backend: &dyn AnalysisBackend,
        index: usize,
    ) -> Result<Toggle, DashboardError> {
        match self.toggle_recommendation(index)? {
            FixAction::Settled(toggle) => Ok(toggle),
            FixAction::Fetch(pending) => {
                let text = backend.fetch_fix_suggestion(&pending.ticket.issue);
                self.finish_fix(pending, text.clone())?;
                Ok(Toggle::Expanded(text))
            }
        }
    }

    pub fn begin_chat(&mut self, input: &str) -> Result<ChatTicket, DashboardError> {
        Ok(self.chat.begin_send(input)?)
    }

    pub fn finish_chat(&mut self, ticket: ChatTicket, reply: String) {
        self.chat.finish_send(ticket, reply);
    }

    pub fn send_chat(
        &mut self,
        backend: &dyn AnalysisBackend,
        input: &str,
    ) -> Result<String, DashboardError> {
        Ok(self.chat.send(backend, input)?)
    }

    fn ensure_not_loading(&self) -> Result<(), DashboardError> {
        if self.is_loading() {
            Err(DashboardError::AnalysisInFlight)
        } else {
            Ok(())
        }
    }
}
