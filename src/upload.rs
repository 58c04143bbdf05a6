//! Upload flow: the selected dataset and the remembered governance profile.

use std::fs;
use std::path::Path;

use crate::profile::GovernanceProfile;

/// Warning shown when a non-CSV file is offered.
pub const NOT_CSV_WARNING: &str = "Please upload a CSV file.";

/// A user-selected dataset: display name plus the raw file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DatasetFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a dataset from disk, using the final path component as its name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Whether the name carries the `.csv` suffix. Case-sensitive.
    pub fn is_csv(&self) -> bool {
        is_csv_name(&self.name)
    }
}

/// Client-side extension filter. `DATA.CSV` does not pass.
pub fn is_csv_name(name: &str) -> bool {
    name.ends_with(".csv")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Please upload a CSV file. ('{name}' rejected)")]
    NotCsv { name: String },
}

/// Where the upload flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    /// No file chosen yet.
    Empty,
    /// A CSV is held and analysis can be triggered.
    FileSelected,
    /// The held file has been handed to an evaluate request.
    Submitted,
}

/// Tracks the selected file and the governance profile independently, so the
/// profile can be chosen before or after the file.
#[derive(Debug, Clone, Default)]
pub struct UploadFlow {
    file: Option<DatasetFile>,
    profile: GovernanceProfile,
    submitted: bool,
}

impl UploadFlow {
    pub fn new(profile: GovernanceProfile) -> Self {
        Self {
            file: None,
            profile,
            submitted: false,
        }
    }

    /// Offer a file. Anything without a `.csv` suffix is rejected and the
    /// current selection is kept.
    pub fn select_file(&mut self, file: DatasetFile) -> Result<(), UploadError> {
        if !file.is_csv() {
            return Err(UploadError::NotCsv { name: file.name });
        }
        self.file = Some(file);
        self.submitted = false;
        Ok(())
    }

    pub fn clear_file(&mut self) {
        self.file = None;
        self.submitted = false;
    }

    pub fn set_profile(&mut self, profile: GovernanceProfile) {
        self.profile = profile;
    }

    pub fn profile(&self) -> GovernanceProfile {
        self.profile
    }

    pub fn file(&self) -> Option<&DatasetFile> {
        self.file.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// Record the profile for a submission and hand back the file to send.
    ///
    /// With no file present this only remembers the profile and returns
    /// `None`; no request should follow.
    pub fn submit(&mut self, profile: GovernanceProfile) -> Option<DatasetFile> {
        self.profile = profile;
        let file = self.file.clone()?;
        self.submitted = true;
        Some(file)
    }

    /// Return to the selectable stage after a request finished.
    pub fn settle(&mut self) {
        self.submitted = false;
    }

    pub fn stage(&self) -> UploadStage {
        match (&self.file, self.submitted) {
            (None, _) => UploadStage::Empty,
            (Some(_), false) => UploadStage::FileSelected,
            (Some(_), true) => UploadStage::Submitted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(name: &str) -> DatasetFile {
        DatasetFile::new(name, b"id,amount\n1,10\n".to_vec())
    }

    #[test]
    fn accepts_csv_suffix() {
        let mut flow = UploadFlow::default();
        flow.select_file(csv("orders.csv")).unwrap();
        assert_eq!(flow.stage(), UploadStage::FileSelected);
        assert_eq!(flow.file().unwrap().name, "orders.csv");
    }

    #[test]
    fn rejects_other_extensions_without_state_change() {
        let mut flow = UploadFlow::default();
        for name in ["orders.xlsx", "orders.csv.bak", "orders", "ORDERS.CSV", "data.Csv"] {
            let err = flow.select_file(csv(name)).unwrap_err();
            assert_eq!(
                err,
                UploadError::NotCsv {
                    name: name.to_string()
                }
            );
            assert_eq!(flow.stage(), UploadStage::Empty);
        }
    }

    #[test]
    fn rejection_keeps_previous_file() {
        let mut flow = UploadFlow::default();
        flow.select_file(csv("first.csv")).unwrap();
        assert!(flow.select_file(csv("second.txt")).is_err());
        assert_eq!(flow.file().unwrap().name, "first.csv");
    }

    #[test]
    fn submit_without_file_only_remembers_profile() {
        let mut flow = UploadFlow::default();
        assert!(flow.submit(GovernanceProfile::Kyc).is_none());
        assert_eq!(flow.profile(), GovernanceProfile::Kyc);
        assert_eq!(flow.stage(), UploadStage::Empty);
    }

    #[test]
    fn submit_with_file_moves_to_submitted() {
        let mut flow = UploadFlow::default();
        flow.select_file(csv("orders.csv")).unwrap();
        let sent = flow.submit(GovernanceProfile::Fraud).unwrap();
        assert_eq!(sent.name, "orders.csv");
        assert_eq!(flow.stage(), UploadStage::Submitted);
        flow.settle();
        assert_eq!(flow.stage(), UploadStage::FileSelected);
    }

    #[test]
    fn warning_text_mentions_csv() {
        let err = UploadError::NotCsv {
            name: "a.txt".into(),
        };
        assert!(err.to_string().starts_with(NOT_CSV_WARNING));
    }
}
