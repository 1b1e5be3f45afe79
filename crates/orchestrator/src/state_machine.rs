use foundry_core::RunStatus;

use crate::error::{OrchestratorError, Result};

/// Transition table for the fixed pipeline.
///
/// Statuses move strictly forward except for the safety-retry edge
/// (`SafetyCheck` back to `Drafting`); bounding that loop to a single
/// retry is the runner's job, the table only admits the edge.
pub struct RunStateMachine;

impl RunStateMachine {
    pub fn validate_transition(from: &RunStatus, to: &RunStatus) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(OrchestratorError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    fn allowed_transitions(from: &RunStatus) -> Vec<RunStatus> {
        match from {
            RunStatus::Created => vec![RunStatus::Drafting],
            RunStatus::Drafting => vec![RunStatus::SafetyCheck],
            RunStatus::SafetyCheck => vec![RunStatus::Drafting, RunStatus::Critiquing],
            RunStatus::Critiquing => vec![RunStatus::PausedForHuman],
            RunStatus::PausedForHuman => vec![RunStatus::Approved],
            RunStatus::Approved => vec![RunStatus::Finalized],
            RunStatus::Finalized => vec![],
        }
    }

    pub fn can_transition(from: &RunStatus, to: &RunStatus) -> bool {
        Self::validate_transition(from, to).is_ok()
    }

    pub fn next_status(current: &RunStatus) -> Option<RunStatus> {
        match current {
            RunStatus::Created => Some(RunStatus::Drafting),
            RunStatus::Drafting => Some(RunStatus::SafetyCheck),
            RunStatus::SafetyCheck => Some(RunStatus::Critiquing),
            RunStatus::Critiquing => Some(RunStatus::PausedForHuman),
            RunStatus::PausedForHuman => Some(RunStatus::Approved),
            RunStatus::Approved => Some(RunStatus::Finalized),
            RunStatus::Finalized => None,
        }
    }
}
