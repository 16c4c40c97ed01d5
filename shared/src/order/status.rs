//! Order lifecycle status machines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Durable order progress stage
///
/// Only the lifecycle coordinator advances this; external writers must
/// go through it to keep ephemeral state in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    Draft,
    PendingConfirmation,
    Processing,
    Completed,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProgressStatus::Draft => "draft",
            ProgressStatus::PendingConfirmation => "pending_confirmation",
            ProgressStatus::Processing => "processing",
            ProgressStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// Durable order payment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

/// Dining-table occupancy state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Empty,
    Occupied,
    Cleaning,
}

/// Requested status-change target
///
/// Superset of [`ProgressStatus`]: `only-processing` asks for the
/// durable status flip without re-routing items (reopening a table
/// already in the kitchen). Unknown wire values are rejected before
/// any side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTarget {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "only-processing")]
    OnlyProcessing,
    #[serde(rename = "pending_confirmation")]
    PendingConfirmation,
    #[serde(rename = "processing")]
    Processing,
    #[serde(rename = "completed")]
    Completed,
}

impl StatusTarget {
    /// Parse a wire value, `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "only-processing" => Some(Self::OnlyProcessing),
            "pending_confirmation" => Some(Self::PendingConfirmation),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// The durable status this target maps to
    pub fn progress(&self) -> ProgressStatus {
        match self {
            Self::Draft => ProgressStatus::Draft,
            Self::OnlyProcessing | Self::Processing => ProgressStatus::Processing,
            Self::PendingConfirmation => ProgressStatus::PendingConfirmation,
            Self::Completed => ProgressStatus::Completed,
        }
    }
}

impl fmt::Display for StatusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::OnlyProcessing => "only-processing",
            Self::PendingConfirmation => "pending_confirmation",
            Self::Processing => "processing",
            Self::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse() {
        assert_eq!(StatusTarget::parse("draft"), Some(StatusTarget::Draft));
        assert_eq!(
            StatusTarget::parse("only-processing"),
            Some(StatusTarget::OnlyProcessing)
        );
        assert_eq!(StatusTarget::parse("unknown"), None);
        assert_eq!(StatusTarget::parse(""), None);
    }

    #[test]
    fn test_progress_serde_wire_names() {
        let s = serde_json::to_string(&ProgressStatus::PendingConfirmation).unwrap();
        assert_eq!(s, "\"pending_confirmation\"");
        let s = serde_json::to_string(&StatusTarget::OnlyProcessing).unwrap();
        assert_eq!(s, "\"only-processing\"");
    }
}
