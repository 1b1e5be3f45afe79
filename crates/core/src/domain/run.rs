use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pipeline position of a run.
///
/// Statuses advance strictly forward except for the single safety-retry
/// edge (`SafetyCheck` back to `Drafting`, at most once per run).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Created,
    Drafting,
    SafetyCheck,
    Critiquing,
    PausedForHuman,
    Approved,
    Finalized,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Drafting => "drafting",
            Self::SafetyCheck => "safety_check",
            Self::Critiquing => "critiquing",
            Self::PausedForHuman => "paused_for_human",
            Self::Approved => "approved",
            Self::Finalized => "finalized",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "drafting" => Some(Self::Drafting),
            "safety_check" => Some(Self::SafetyCheck),
            "critiquing" => Some(Self::Critiquing),
            "paused_for_human" => Some(Self::PausedForHuman),
            "approved" => Some(Self::Approved),
            "finalized" => Some(Self::Finalized),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

/// One draft produced by the drafting stage, kept for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DraftVersion {
    pub version: u32,
    pub text: String,
}

/// The mutable payload carried between pipeline stages.
///
/// Checkpoints store a full copy of this struct, so every field must be a
/// plain value; stages receive a reference and return a fresh copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, ToSchema)]
pub struct RunState {
    /// Human-supplied goal; mutable while the run is not finalized.
    pub intent_text: String,
    /// Latest draft content, overwritten by stages or by human approval.
    pub current_draft_text: String,
    /// Flag categories raised by the safety stage; append-only within a run.
    pub safety_flags: Vec<String>,
    pub status: RunStatus,
    /// Set only by the summary stage after finalization.
    pub final_summary: Option<String>,
    /// Every draft the drafting stage produced, versioned from 1.
    pub draft_versions: Vec<DraftVersion>,
    /// Number of drafting stage invocations so far.
    pub iteration_count: u32,
    /// Prose assessment from the safety stage.
    pub safety_report: Option<String>,
    /// Coarse safety score from the safety stage; low when flagged.
    pub safety_score: Option<f32>,
    /// Commentary from the critique stage.
    pub critique: Option<String>,
    /// Suggested rewrite from the critique stage.
    pub proposed_revision: Option<String>,
}

impl RunState {
    pub fn new(intent_text: impl Into<String>) -> Self {
        Self {
            intent_text: intent_text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRunRequest {
    pub intent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApproveRequest {
    /// Final text as edited by the reviewer.
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MutateIntentRequest {
    pub intent: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_creation() {
        let state = RunState::new("Create a CBT exercise for insomnia");

        assert_eq!(state.intent_text, "Create a CBT exercise for insomnia");
        assert_eq!(state.status, RunStatus::Created);
        assert!(state.current_draft_text.is_empty());
        assert!(state.safety_flags.is_empty());
        assert!(state.final_summary.is_none());
        assert_eq!(state.iteration_count, 0);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(RunStatus::Created.as_str(), "created");
        assert_eq!(RunStatus::SafetyCheck.as_str(), "safety_check");
        assert_eq!(RunStatus::PausedForHuman.as_str(), "paused_for_human");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(RunStatus::parse("drafting"), Some(RunStatus::Drafting));
        assert_eq!(
            RunStatus::parse("paused_for_human"),
            Some(RunStatus::PausedForHuman)
        );
        assert_eq!(RunStatus::parse("invalid"), None);
    }

    #[test]
    fn test_status_round_trip() {
        let all = [
            RunStatus::Created,
            RunStatus::Drafting,
            RunStatus::SafetyCheck,
            RunStatus::Critiquing,
            RunStatus::PausedForHuman,
            RunStatus::Approved,
            RunStatus::Finalized,
        ];
        for status in all {
            assert_eq!(RunStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_terminal_status() {
        assert!(RunStatus::Finalized.is_terminal());
        assert!(!RunStatus::Approved.is_terminal());
        assert!(!RunStatus::Created.is_terminal());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let state = RunState::new("test");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"status\":\"created\""));
        assert!(json.contains("intent_text"));
    }
}
