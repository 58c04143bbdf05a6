//! Recommendation list with per-row expand/collapse and a lazy fix cache.
//!
//! Rows open and close independently. Opening a row whose fix text is not
//! cached yet hands out a [`FixTicket`]; the caller performs the request and
//! returns the text through [`RecommendationPanel::finish_fix`]. Cached text
//! is keyed by the recommendation itself, not its position, and lives exactly
//! as long as the panel (one analysis result).

use std::collections::{BTreeSet, HashMap};

use crate::backend::AnalysisBackend;

/// Rows shown when the backend returns no recommendations.
pub const PLACEHOLDER_RECOMMENDATIONS: [&str; 3] = [
    "Standardize date format to ISO-8601",
    "Impute missing Merchant IDs",
    "Validate transaction amounts",
];

/// Pending fix request for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixTicket {
    pub index: usize,
    pub issue: String,
}

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// The row was open and is now closed.
    Collapsed,
    /// The row opened with cached fix text.
    Expanded(String),
    /// No cached text: the caller must fetch it.
    Fetch(FixTicket),
    /// A fetch for this row is already running; the toggle is disabled.
    Pending,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("no recommendation at position {index} (list has {len})")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRow<'a> {
    pub index: usize,
    pub text: &'a str,
    pub expanded: bool,
    pub loading: bool,
    /// Fix paragraphs, present only while the row is open.
    pub fix: Option<Vec<&'a str>>,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationPanel {
    items: Vec<String>,
    expanded: BTreeSet<usize>,
    loading: BTreeSet<usize>,
    solutions: HashMap<String, String>,
}

impl RecommendationPanel {
    /// Build the panel for a result. An empty list falls back to the
    /// placeholder rows.
    pub fn new(items: Vec<String>) -> Self {
        let items = if items.is_empty() {
            PLACEHOLDER_RECOMMENDATIONS
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            items
        };
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn is_loading(&self, index: usize) -> bool {
        self.loading.contains(&index)
    }

    /// Cached fix text for a row, if it was fetched before.
    pub fn cached_fix(&self, index: usize) -> Option<&str> {
        let issue = self.items.get(index)?;
        self.solutions.get(issue).map(String::as_str)
    }

    /// Flip one row.
    pub fn toggle(&mut self, index: usize) -> Result<Toggle, PanelError> {
        let issue = self.items.get(index).ok_or(PanelError::OutOfRange {
            index,
            len: self.items.len(),
        })?;

        if self.loading.contains(&index) {
            return Ok(Toggle::Pending);
        }
        if self.expanded.remove(&index) {
            return Ok(Toggle::Collapsed);
        }
        if let Some(text) = self.solutions.get(issue) {
            let text = text.clone();
            self.expanded.insert(index);
            return Ok(Toggle::Expanded(text));
        }

        let ticket = FixTicket {
            index,
            issue: issue.clone(),
        };
        self.loading.insert(index);
        Ok(Toggle::Fetch(ticket))
    }

    /// Store fetched fix text and open the row.
    ///
    /// A ticket whose row no longer carries the same recommendation is
    /// dropped: the text is still cached under its own recommendation, but
    /// no unrelated row is opened.
    pub fn finish_fix(&mut self, ticket: FixTicket, text: String) {
        self.loading.remove(&ticket.index);
        let matches_row = self
            .items
            .get(ticket.index)
            .is_some_and(|item| *item == ticket.issue);
        self.solutions.insert(ticket.issue, text);
        if matches_row {
            self.expanded.insert(ticket.index);
        }
    }

    /// Toggle a row, fetching from `backend` when needed.
    pub fn toggle_with(
        &mut self,
        backend: &dyn AnalysisBackend,
        index: usize,
    ) -> Result<Toggle, PanelError> {
        match self.toggle(index)? {
            Toggle::Fetch(ticket) => {
                let text = backend.fetch_fix_suggestion(&ticket.issue);
                self.finish_fix(ticket, text.clone());
                Ok(Toggle::Expanded(text))
            }
            other => Ok(other),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = RecommendationRow<'_>> {
        self.items.iter().enumerate().map(|(index, text)| {
            let expanded = self.is_expanded(index);
            RecommendationRow {
                index,
                text,
                expanded,
                loading: self.is_loading(index),
                fix: expanded
                    .then(|| self.solutions.get(text))
                    .flatten()
                    .map(|fix| fix_paragraphs(fix)),
            }
        })
    }
}

/// Split fix text into paragraphs on line breaks.
pub fn fix_paragraphs(text: &str) -> Vec<&str> {
    text.split('\n').map(|line| line.trim_end_matches('\r')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(items: &[&str]) -> RecommendationPanel {
        RecommendationPanel::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn empty_list_uses_placeholders() {
        let p = RecommendationPanel::new(Vec::new());
        assert_eq!(p.items(), PLACEHOLDER_RECOMMENDATIONS.map(String::from));
    }

    #[test]
    fn first_open_requires_fetch_second_reuses_cache() {
        let mut p = panel(&["Dedupe IDs"]);
        let Toggle::Fetch(ticket) = p.toggle(0).unwrap() else {
            panic!("expected fetch");
        };
        assert!(p.is_loading(0));
        assert_eq!(p.toggle(0).unwrap(), Toggle::Pending);

        p.finish_fix(ticket, "Step 1\nStep 2".into());
        assert!(p.is_expanded(0));
        assert_eq!(p.toggle(0).unwrap(), Toggle::Collapsed);
        assert_eq!(
            p.toggle(0).unwrap(),
            Toggle::Expanded("Step 1\nStep 2".into())
        );
    }

    #[test]
    fn rows_open_independently() {
        let mut p = panel(&["a", "b", "c"]);
        for i in [0, 2] {
            let Toggle::Fetch(t) = p.toggle(i).unwrap() else {
                panic!("expected fetch");
            };
            p.finish_fix(t, format!("fix {i}"));
        }
        let open: Vec<usize> = p.rows().filter(|r| r.expanded).map(|r| r.index).collect();
        assert_eq!(open, vec![0, 2]);
        let row = p.rows().nth(2).unwrap();
        assert_eq!(row.fix, Some(vec!["fix 2"]));
        assert_eq!(p.rows().nth(1).unwrap().fix, None);
    }

    #[test]
    fn out_of_range_toggle_errors() {
        let mut p = panel(&["a"]);
        assert_eq!(
            p.toggle(3).unwrap_err(),
            PanelError::OutOfRange { index: 3, len: 1 }
        );
    }

    #[test]
    fn paragraphs_split_on_line_breaks() {
        assert_eq!(fix_paragraphs("one\r\ntwo\n\nthree"), vec!["one", "two", "", "three"]);
    }
}
