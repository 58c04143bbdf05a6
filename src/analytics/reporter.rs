//! Request history reporting over the JSONL request log.
//!
//! Groups requests by operation and reports counts, failures and latency,
//! plus how often each governance profile was evaluated.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analytics::logger::{self, Operation, RequestLogEntry};
use crate::profile::GovernanceProfile;

/// Per-operation aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStat {
    pub operation: Operation,
    pub count: usize,
    pub failures: usize,
    pub avg_latency_ms: f64,
    pub max_latency_ms: u64,
}

impl OperationStat {
    pub fn failure_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.failures as f64 / self.count as f64) * 100.0
        }
    }
}

/// Summary for `dqai history`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    pub total_requests: usize,
    pub operations: Vec<OperationStat>,
    pub profiles: BTreeMap<GovernanceProfile, usize>,
    /// Timestamp of the newest entry.
    pub last_request: Option<String>,
}

/// Summarize the log, optionally limited to the last `days` days.
pub fn compute_history(days: Option<u32>) -> History {
    let entries = logger::read_entries_since_days(days);
    build_history(&entries)
}

fn build_history(entries: &[RequestLogEntry]) -> History {
    let mut groups: BTreeMap<Operation, Vec<&RequestLogEntry>> = BTreeMap::new();
    let mut profiles: BTreeMap<GovernanceProfile, usize> = BTreeMap::new();

    for entry in entries {
        groups.entry(entry.operation).or_default().push(entry);
        if let Some(profile) = entry.profile {
            *profiles.entry(profile).or_default() += 1;
        }
    }

    let operations = groups
        .into_iter()
        .map(|(operation, group)| {
            let count = group.len();
            let total_latency: u64 = group.iter().map(|e| e.latency_ms).sum();
            OperationStat {
                operation,
                count,
                failures: group.iter().filter(|e| !e.success).count(),
                avg_latency_ms: if count == 0 {
                    0.0
                } else {
                    total_latency as f64 / count as f64
                },
                max_latency_ms: group.iter().map(|e| e.latency_ms).max().unwrap_or(0),
            }
        })
        .collect();

    History {
        total_requests: entries.len(),
        operations,
        profiles,
        last_request: entries.iter().map(|e| e.timestamp.clone()).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        timestamp: &str,
        operation: Operation,
        profile: Option<GovernanceProfile>,
        success: bool,
        latency_ms: u64,
    ) -> RequestLogEntry {
        RequestLogEntry {
            timestamp: timestamp.to_string(),
            operation,
            profile,
            success,
            latency_ms,
            status: None,
            error: None,
        }
    }

    fn sample_entries() -> Vec<RequestLogEntry> {
        vec![
            entry(
                "2026-01-05T10:00:00+00:00",
                Operation::Evaluate,
                Some(GovernanceProfile::Fraud),
                true,
                900,
            ),
            entry(
                "2026-01-05T10:01:00+00:00",
                Operation::Evaluate,
                Some(GovernanceProfile::Kyc),
                false,
                100,
            ),
            entry("2026-01-05T10:02:00+00:00", Operation::Fix, None, true, 400),
            entry("2026-01-05T10:03:00+00:00", Operation::Chat, None, true, 300),
            entry("2026-01-05T10:04:00+00:00", Operation::Chat, None, false, 50),
            entry(
                "2026-01-05T10:05:00+00:00",
                Operation::Evaluate,
                Some(GovernanceProfile::Fraud),
                true,
                800,
            ),
        ]
    }

    #[test]
    fn groups_by_operation() {
        let history = build_history(&sample_entries());
        assert_eq!(history.total_requests, 6);

        let evaluate = &history.operations[0];
        assert_eq!(evaluate.operation, Operation::Evaluate);
        assert_eq!(evaluate.count, 3);
        assert_eq!(evaluate.failures, 1);
        assert_eq!(evaluate.avg_latency_ms, 600.0);
        assert_eq!(evaluate.max_latency_ms, 900);

        let chat = history
            .operations
            .iter()
            .find(|s| s.operation == Operation::Chat)
            .unwrap();
        assert_eq!(chat.failure_pct(), 50.0);
    }

    #[test]
    fn counts_profiles_for_evaluations_only() {
        let history = build_history(&sample_entries());
        assert_eq!(history.profiles[&GovernanceProfile::Fraud], 2);
        assert_eq!(history.profiles[&GovernanceProfile::Kyc], 1);
        assert_eq!(history.profiles.len(), 2);
        assert_eq!(
            history.last_request.as_deref(),
            Some("2026-01-05T10:05:00+00:00")
        );
    }

    #[test]
    fn empty_log() {
        let history = build_history(&[]);
        assert_eq!(history.total_requests, 0);
        assert!(history.operations.is_empty());
        assert!(history.last_request.is_none());
    }

    #[test]
    fn history_serializes_with_profile_keys() {
        let json = serde_json::to_string(&build_history(&sample_entries())).unwrap();
        assert!(json.contains(r#""profiles":{"fraud":2,"kyc":1}"#));
    }
}
