use std::sync::Arc;

use async_trait::async_trait;
use foundry_core::RunState;
use orchestrator::{StageAgent, StageError};
use regex::Regex;

use crate::backend::TextBackend;
use crate::prompts;

const SCORE_CLEAN: f32 = 0.95;
const SCORE_FLAGGED: f32 = 0.2;

struct DenyRule {
    category: &'static str,
    pattern: Regex,
}

/// Screens the draft: asks the backend for a prose assessment and scans the
/// text against a fixed deny-term list. Matched categories are appended to
/// `safety_flags`; flags are never removed within a run.
pub struct SafetyGuardian {
    backend: Arc<dyn TextBackend>,
    rules: Vec<DenyRule>,
}

impl SafetyGuardian {
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self {
            backend,
            rules: deny_rules(),
        }
    }
}

fn deny_rules() -> Vec<DenyRule> {
    let patterns = [
        (
            "possible self-harm content",
            r"(?i)\b(suicide|suicidal|self[- ]?harm|hurt (?:myself|yourself))\b",
        ),
        (
            "medication advice",
            r"(?i)\b(dosage|prescri(?:be|ption)|milligrams?|\d+\s*mg)\b",
        ),
        (
            "crisis guidance",
            r"(?i)\b(overdose|emergency treatment)\b",
        ),
    ];

    patterns
        .into_iter()
        .map(|(category, pattern)| DenyRule {
            category,
            pattern: Regex::new(pattern).expect("deny pattern compiles"),
        })
        .collect()
}

#[async_trait]
impl StageAgent for SafetyGuardian {
    fn name(&self) -> &'static str {
        "safety_guardian"
    }

    async fn run(&self, state: &RunState) -> Result<RunState, StageError> {
        let mut next = state.clone();

        let report = self
            .backend
            .complete(&prompts::safety_review(&next.current_draft_text))
            .await?;
        next.safety_report = Some(report.trim().to_string());

        let mut clean = true;
        for rule in &self.rules {
            if rule.pattern.is_match(&next.current_draft_text) {
                clean = false;
                if !next.safety_flags.iter().any(|f| f == rule.category) {
                    next.safety_flags.push(rule.category.to_string());
                }
            }
        }
        next.safety_score = Some(if clean { SCORE_CLEAN } else { SCORE_FLAGGED });

        if !clean {
            tracing::info!(flags = ?next.safety_flags, "draft flagged by safety scan");
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use foundry_core::RunStatus;

    fn agent() -> SafetyGuardian {
        SafetyGuardian::new(Arc::new(MockBackend::new()))
    }

    fn state_with_draft(draft: &str) -> RunState {
        let mut state = RunState::new("goal");
        state.status = RunStatus::SafetyCheck;
        state.current_draft_text = draft.to_string();
        state
    }

    #[tokio::test]
    async fn test_clean_draft() {
        let state = state_with_draft("Take three slow breaths and note one thought.");

        let next = agent().run(&state).await.unwrap();

        assert!(next.safety_flags.is_empty());
        assert_eq!(next.safety_score, Some(SCORE_CLEAN));
        assert!(next.safety_report.is_some());
    }

    #[tokio::test]
    async fn test_flagged_draft() {
        let state = state_with_draft("If you feel suicidal, try this exercise.");

        let next = agent().run(&state).await.unwrap();

        assert_eq!(
            next.safety_flags,
            vec!["possible self-harm content".to_string()]
        );
        assert_eq!(next.safety_score, Some(SCORE_FLAGGED));
    }

    #[tokio::test]
    async fn test_medication_terms_flagged() {
        let state = state_with_draft("Increase the dosage to 50 mg before bed.");

        let next = agent().run(&state).await.unwrap();

        assert!(next
            .safety_flags
            .iter()
            .any(|f| f == "medication advice"));
    }

    #[tokio::test]
    async fn test_existing_flags_are_kept_not_duplicated() {
        let mut state = state_with_draft("Still mentions self-harm in passing.");
        state.safety_flags.push("possible self-harm content".to_string());

        let next = agent().run(&state).await.unwrap();

        let matches = next
            .safety_flags
            .iter()
            .filter(|f| *f == "possible self-harm content")
            .count();
        assert_eq!(matches, 1);
    }

    #[tokio::test]
    async fn test_near_miss_terms_do_not_flag() {
        // "mgmt" is not "mg", "emergencies" is not "emergency treatment".
        let state = state_with_draft("A note about mgmt handling of emergencies.");

        let next = agent().run(&state).await.unwrap();
        assert!(next.safety_flags.is_empty());
    }
}
