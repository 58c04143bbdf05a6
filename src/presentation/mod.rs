//! Presentation rules and view models.
//!
//! Everything here is a pure function of dashboard state: severity banding,
//! gauge geometry, dimension bars, insight text and the serializable
//! [`DashboardView`] consumed by the web front end. The terminal renderer in
//! [`terminal`] draws the same view models with ANSI colors.

pub mod terminal;

use serde::Serialize;

use crate::backend::AnalysisResult;
use crate::chat::{ChatMessage, TYPING_INDICATOR};
use crate::profile::GovernanceProfile;
use crate::recommendations::RecommendationPanel;
use crate::session::{Dashboard, Screen};

// ---------------------------------------------------------------------------
// Severity bands
// ---------------------------------------------------------------------------

/// Score band shared by the gauge and every dimension bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// `score >= 80`
    Good,
    /// `50 <= score < 80`
    Warning,
    /// `score < 50`
    Critical,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }

    /// Fixed display color.
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#00e676",
            Self::Warning => "#ffc400",
            Self::Critical => "#ff1744",
        }
    }
}

/// Format a score the way it was received: `62`, `62.5`.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.is_finite() {
        format!("{score:.0}")
    } else {
        format!("{score}")
    }
}

// ---------------------------------------------------------------------------
// Gauge and bars
// ---------------------------------------------------------------------------

/// Two-segment ring: quality and gap, summing to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gauge {
    /// Center label, the score as received.
    pub label: String,
    pub quality: f64,
    pub gap: f64,
    pub severity: Severity,
    pub color: &'static str,
}

impl Gauge {
    pub fn new(dqs: f64) -> Self {
        let quality = clamp_pct(dqs);
        let severity = Severity::from_score(dqs);
        Self {
            label: format_score(dqs),
            quality,
            gap: 100.0 - quality,
            severity,
            color: severity.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionBar {
    pub name: String,
    /// Name with its first letter upper-cased.
    pub label: String,
    pub score: f64,
    /// `"{score}%"`
    pub score_text: String,
    /// Fill width in percent, clamped to [0, 100].
    pub width_pct: f64,
    pub severity: Severity,
    pub color: &'static str,
}

impl DimensionBar {
    pub fn new(name: &str, score: f64) -> Self {
        let severity = Severity::from_score(score);
        Self {
            name: name.to_string(),
            label: capitalize(name),
            score,
            score_text: format!("{}%", format_score(score)),
            width_pct: clamp_pct(score),
            severity,
            color: severity.color(),
        }
    }
}

fn clamp_pct(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationView {
    pub index: usize,
    pub text: String,
    pub expanded: bool,
    pub loading: bool,
    /// Fix paragraphs while the row is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub profile: GovernanceProfile,
    pub gauge: Gauge,
    pub dimensions: Vec<DimensionBar>,
    pub insights: String,
    pub recommendations: Vec<RecommendationView>,
}

impl ResultView {
    pub fn new(
        result: &AnalysisResult,
        profile: GovernanceProfile,
        panel: &RecommendationPanel,
    ) -> Self {
        Self {
            profile,
            gauge: Gauge::new(result.dqs),
            dimensions: result
                .dimensions
                .iter()
                .map(|(name, score)| DimensionBar::new(name, *score))
                .collect(),
            insights: result.insights.display_text(),
            recommendations: panel
                .rows()
                .map(|row| RecommendationView {
                    index: row.index,
                    text: row.text.to_string(),
                    expanded: row.expanded,
                    loading: row.loading,
                    fix: row
                        .fix
                        .map(|lines| lines.into_iter().map(String::from).collect()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileOption {
    pub tag: GovernanceProfile,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typing_indicator: Option<&'static str>,
}

/// Everything the browser needs to draw the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub screen: Screen,
    /// Navbar status: `ANALYZING...` while loading, `ACTIVE` otherwise.
    pub status: &'static str,
    pub profile: GovernanceProfile,
    pub profiles: Vec<ProfileOption>,
    pub profile_selector_enabled: bool,
    pub file_name: Option<String>,
    /// Label of the analyze button, present once a file is selected.
    pub analyze_label: Option<String>,
    pub result: Option<ResultView>,
    pub chat: ChatView,
}

impl DashboardView {
    pub fn from_dashboard(dash: &Dashboard) -> Self {
        let profile = dash.profile();
        let file_name = dash.upload().file().map(|f| f.name.clone());
        Self {
            screen: dash.screen(),
            status: if dash.is_loading() {
                "ANALYZING..."
            } else {
                "ACTIVE"
            },
            profile,
            profiles: GovernanceProfile::ALL
                .iter()
                .map(|p| ProfileOption {
                    tag: *p,
                    label: p.label(),
                })
                .collect(),
            profile_selector_enabled: dash.profile_selector_enabled(),
            analyze_label: file_name
                .as_ref()
                .map(|_| format!("Initialize {} Agent", profile.tag().to_uppercase())),
            file_name,
            result: dash
                .analysis()
                .map(|a| ResultView::new(&a.result, a.profile, &a.recommendations)),
            chat: ChatView {
                messages: dash.chat().messages().to_vec(),
                typing: dash.chat().is_typing(),
                typing_indicator: dash.chat().is_typing().then_some(TYPING_INDICATOR),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banding_edges() {
        assert_eq!(Severity::from_score(100.0), Severity::Good);
        assert_eq!(Severity::from_score(80.0), Severity::Good);
        assert_eq!(Severity::from_score(79.99), Severity::Warning);
        assert_eq!(Severity::from_score(50.0), Severity::Warning);
        assert_eq!(Severity::from_score(49.9), Severity::Critical);
        assert_eq!(Severity::from_score(0.0), Severity::Critical);
        assert_eq!(Severity::from_score(f64::NAN), Severity::Critical);
    }

    #[test]
    fn every_integer_score_bands_consistently() {
        for score in 0..=100 {
            let score = f64::from(score);
            let bar = DimensionBar::new("x", score);
            let gauge = Gauge::new(score);
            assert_eq!(bar.severity, gauge.severity);
            assert_eq!(bar.width_pct, score);
            let expected = if score >= 80.0 {
                "#00e676"
            } else if score >= 50.0 {
                "#ffc400"
            } else {
                "#ff1744"
            };
            assert_eq!(bar.color, expected);
        }
    }

    #[test]
    fn gauge_segments_sum_to_100() {
        let gauge = Gauge::new(62.0);
        assert_eq!(gauge.label, "62");
        assert_eq!((gauge.quality, gauge.gap), (62.0, 38.0));
        let over = Gauge::new(140.0);
        assert_eq!((over.quality, over.gap), (100.0, 0.0));
        assert_eq!(over.label, "140");
    }

    #[test]
    fn scores_keep_their_precision() {
        assert_eq!(format_score(62.0), "62");
        assert_eq!(format_score(62.5), "62.5");
        assert_eq!(DimensionBar::new("validity", 87.25).score_text, "87.25%");
    }

    #[test]
    fn dimension_labels_are_capitalized() {
        assert_eq!(DimensionBar::new("completeness", 1.0).label, "Completeness");
        assert_eq!(DimensionBar::new("Uniqueness", 1.0).label, "Uniqueness");
        assert_eq!(DimensionBar::new("", 1.0).label, "");
    }

    #[test]
    fn dashboard_view_tracks_gating() {
        let mut dash = Dashboard::new(GovernanceProfile::Fraud);
        let view = DashboardView::from_dashboard(&dash);
        assert_eq!(view.screen, Screen::Upload);
        assert!(!view.profile_selector_enabled);
        assert_eq!(view.analyze_label, None);
        assert_eq!(view.chat.messages.len(), 1);

        dash.select_file(crate::upload::DatasetFile::new("orders.csv", Vec::new()))
            .unwrap();
        let view = DashboardView::from_dashboard(&dash);
        assert!(view.profile_selector_enabled);
        assert_eq!(view.analyze_label.as_deref(), Some("Initialize FRAUD Agent"));
        assert_eq!(view.status, "ACTIVE");
    }
}
