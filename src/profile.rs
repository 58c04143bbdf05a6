//! Governance profiles.
//!
//! A profile is a backend-side weighting preset. The client only knows the
//! four tags, their display labels, and which dimension each one stresses;
//! the actual weighting is opaque.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Governance profile sent with every evaluate request as the `context` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovernanceProfile {
    /// Balanced weighting for reporting workloads.
    #[default]
    Analytics,
    /// Identity verification; completeness weighs most.
    Kyc,
    /// Fraud detection; uniqueness and timeliness weigh most.
    Fraud,
    /// Merchant onboarding; validity weighs most.
    Merchant,
}

impl GovernanceProfile {
    /// All profiles in selector order.
    pub const ALL: [GovernanceProfile; 4] = [
        GovernanceProfile::Analytics,
        GovernanceProfile::Kyc,
        GovernanceProfile::Fraud,
        GovernanceProfile::Merchant,
    ];

    /// Wire tag (`analytics`, `kyc`, `fraud`, `merchant`).
    pub fn tag(self) -> &'static str {
        match self {
            Self::Analytics => "analytics",
            Self::Kyc => "kyc",
            Self::Fraud => "fraud",
            Self::Merchant => "merchant",
        }
    }

    /// Human-readable label shown in profile selectors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Analytics => "General Analytics (Balanced)",
            Self::Kyc => "KYC & Identity (Completeness Focus)",
            Self::Fraud => "Fraud Detection (Uniqueness Focus)",
            Self::Merchant => "Merchant Onboarding (Validity Focus)",
        }
    }
}

impl fmt::Display for GovernanceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when a string is not one of the four profile tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown governance profile '{0}' (expected analytics, kyc, fraud or merchant)")]
pub struct UnknownProfile(pub String);

impl FromStr for GovernanceProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "analytics" => Ok(Self::Analytics),
            "kyc" => Ok(Self::Kyc),
            "fraud" => Ok(Self::Fraud),
            "merchant" => Ok(Self::Merchant),
            _ => Err(UnknownProfile(s.to_string())),
        }
    }
}
