use db::CheckpointRepository;
use events::FeedRegistry;
use foundry_core::{Checkpoint, RunState, RunStatus};
use futures::Stream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};
use crate::registry::RunRegistry;
use crate::stage::{PipelineAgents, StageAgent};
use crate::state_machine::RunStateMachine;

const AGENT_ORCHESTRATOR: &str = "orchestrator";
const AGENT_SUPERVISOR: &str = "supervisor";
const AGENT_HUMAN: &str = "human";

/// Outcome of one stage invocation: either the run advanced, or the stage
/// failed and the run halted in its last good state.
enum StageOutcome {
    Advanced(RunState),
    Halted,
}

/// Drives runs through the fixed pipeline.
///
/// Stateless between calls: every operation rehydrates the working state
/// from the latest checkpoint, so the process can be restarted at any time
/// and resume from the durable log. Mutations for the same run are
/// serialized by the registry's per-run gate; a checkpoint is always
/// durably appended before it is broadcast.
pub struct RunOrchestrator {
    store: CheckpointRepository,
    feeds: FeedRegistry,
    registry: RunRegistry,
    agents: PipelineAgents,
}

impl RunOrchestrator {
    pub fn new(store: CheckpointRepository, agents: PipelineAgents) -> Self {
        Self {
            store,
            feeds: FeedRegistry::new(),
            registry: RunRegistry::new(),
            agents,
        }
    }

    /// Create a run and synchronously drive it to `paused_for_human` (or to
    /// a halt if a stage fails), one checkpoint per stage transition.
    ///
    /// The safety stage may send the run back to drafting exactly once;
    /// after the retry the second check's findings are recorded but never
    /// branch the flow again, so the stage count is bounded.
    pub async fn start(&self, intent: &str) -> Result<Uuid> {
        let agents = self.agents.clone();
        let entry = self.registry.create();
        let run_id = entry.id();
        let _gate = entry.lock().await;

        let state = RunState::new(intent);
        self.commit(run_id, AGENT_ORCHESTRATOR, "run started", &state)
            .await?;
        info!(run_id = %run_id, "run started");

        let state = match self
            .run_stage(run_id, &*agents.draftsman, RunStatus::Drafting, state)
            .await?
        {
            StageOutcome::Advanced(next) => next,
            StageOutcome::Halted => return Ok(run_id),
        };

        let state = match self
            .run_stage(run_id, &*agents.safety_guardian, RunStatus::SafetyCheck, state)
            .await?
        {
            StageOutcome::Advanced(next) => next,
            StageOutcome::Halted => return Ok(run_id),
        };

        let state = if state.safety_flags.is_empty() {
            state
        } else {
            info!(
                run_id = %run_id,
                flags = ?state.safety_flags,
                "safety flags raised, retrying draft once"
            );
            let state = match self
                .run_stage(run_id, &*agents.draftsman, RunStatus::Drafting, state)
                .await?
            {
                StageOutcome::Advanced(next) => next,
                StageOutcome::Halted => return Ok(run_id),
            };
            match self
                .run_stage(run_id, &*agents.safety_guardian, RunStatus::SafetyCheck, state)
                .await?
            {
                StageOutcome::Advanced(next) => next,
                StageOutcome::Halted => return Ok(run_id),
            }
        };

        let state = match self
            .run_stage(run_id, &*agents.clinical_critic, RunStatus::Critiquing, state)
            .await?
        {
            StageOutcome::Advanced(next) => next,
            StageOutcome::Halted => return Ok(run_id),
        };

        RunStateMachine::validate_transition(&state.status, &RunStatus::PausedForHuman)?;
        let mut state = state;
        state.status = RunStatus::PausedForHuman;
        self.commit(run_id, AGENT_SUPERVISOR, "awaiting human review", &state)
            .await?;
        info!(run_id = %run_id, "run paused for human review");

        Ok(run_id)
    }

    /// Accept the reviewer's edited text and finalize the run. Legal only
    /// from `paused_for_human`; appends an `approved` checkpoint followed
    /// immediately by a `finalized` one.
    pub async fn approve(&self, run_id: Uuid, edited_text: &str) -> Result<RunState> {
        let entry = self.registry.get_or_insert(run_id);
        let _gate = entry.lock().await;

        let mut state = self.store.latest(run_id).await?.state_snapshot;
        RunStateMachine::validate_transition(&state.status, &RunStatus::Approved)?;

        state.current_draft_text = edited_text.to_string();
        state.status = RunStatus::Approved;
        self.commit(run_id, AGENT_HUMAN, "approved by human", &state)
            .await?;

        state.status = RunStatus::Finalized;
        self.commit(run_id, AGENT_ORCHESTRATOR, "run finalized", &state)
            .await?;
        info!(run_id = %run_id, "run finalized");

        Ok(state)
    }

    /// Replace the run's intent while it is not finalized. Prior stages are
    /// not re-run; the new intent applies to whatever comes next.
    pub async fn mutate_intent(&self, run_id: Uuid, new_intent: &str) -> Result<RunState> {
        let entry = self.registry.get_or_insert(run_id);
        let _gate = entry.lock().await;

        let mut state = self.store.latest(run_id).await?.state_snapshot;
        if state.status.is_terminal() {
            return Err(OrchestratorError::InvalidTransition {
                from: state.status.as_str().to_string(),
                to: "intent mutation".to_string(),
            });
        }

        state.intent_text = new_intent.to_string();
        self.commit(run_id, AGENT_HUMAN, "intent updated", &state)
            .await?;
        info!(run_id = %run_id, "intent updated");

        Ok(state)
    }

    /// Generate (or regenerate) the run summary. Legal only once the run is
    /// finalized; every call recomputes and appends a fresh checkpoint, the
    /// prior ones stay untouched.
    pub async fn summarize(&self, run_id: Uuid) -> Result<String> {
        let agents = self.agents.clone();
        let entry = self.registry.get_or_insert(run_id);
        let _gate = entry.lock().await;

        let state = self.store.latest(run_id).await?.state_snapshot;
        if state.status != RunStatus::Finalized {
            return Err(OrchestratorError::InvalidTransition {
                from: state.status.as_str().to_string(),
                to: "summary".to_string(),
            });
        }

        let summarizer = &*agents.summarizer;
        match summarizer.run(&state).await {
            Ok(next) => {
                self.commit(run_id, summarizer.name(), "summary generated", &next)
                    .await?;
                Ok(next.final_summary.unwrap_or_default())
            }
            Err(err) => {
                warn!(run_id = %run_id, stage = summarizer.name(), error = %err, "summary stage failed");
                let note = format!("stage failed: {err}");
                self.commit(run_id, summarizer.name(), &note, &state).await?;
                Err(OrchestratorError::StageFailed {
                    stage: summarizer.name().to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Latest checkpoint of a run.
    pub async fn state(&self, run_id: Uuid) -> Result<Checkpoint> {
        Ok(self.store.latest(run_id).await?)
    }

    /// Full checkpoint history of a run, in sequence order.
    pub async fn history(&self, run_id: Uuid) -> Result<Vec<Checkpoint>> {
        Ok(self.store.history(run_id).await?)
    }

    /// Replay-then-live checkpoint stream for a run. `after` resumes past a
    /// known sequence number (e.g. an SSE `Last-Event-ID`). The feed is
    /// backfilled from the store first, so subscriptions survive a process
    /// restart.
    pub async fn subscribe(
        &self,
        run_id: Uuid,
        after: Option<i64>,
    ) -> Result<impl Stream<Item = Checkpoint> + Send + 'static> {
        let persisted = self.store.history(run_id).await?;
        let feed = self.feeds.get_or_create(run_id);
        feed.seed_missing(persisted);
        Ok(feed.replay_then_follow(after))
    }

    /// Run one stage: validate the status transition, hand the agent a
    /// working copy, and checkpoint whatever it returns. On failure the
    /// last good snapshot is committed unchanged under the failing stage's
    /// name and the run halts there.
    async fn run_stage(
        &self,
        run_id: Uuid,
        agent: &dyn StageAgent,
        to: RunStatus,
        state: RunState,
    ) -> Result<StageOutcome> {
        RunStateMachine::validate_transition(&state.status, &to)?;

        let mut working = state.clone();
        working.status = to;

        match agent.run(&working).await {
            Ok(next) => {
                let note = stage_note(to, &next);
                self.commit(run_id, agent.name(), &note, &next).await?;
                Ok(StageOutcome::Advanced(next))
            }
            Err(err) => {
                warn!(
                    run_id = %run_id,
                    stage = agent.name(),
                    error = %err,
                    "stage failed, halting run in last good state"
                );
                let note = format!("stage failed: {err}");
                self.commit(run_id, agent.name(), &note, &state).await?;
                Ok(StageOutcome::Halted)
            }
        }
    }

    /// Durably append, then broadcast. Observers only ever see committed
    /// snapshots.
    async fn commit(
        &self,
        run_id: Uuid,
        agent_name: &str,
        note: &str,
        state: &RunState,
    ) -> Result<Checkpoint> {
        let checkpoint = self.store.append(run_id, agent_name, note, state).await?;
        self.feeds.get_or_create(run_id).push(checkpoint.clone());
        debug!(
            run_id = %run_id,
            seq = checkpoint.sequence_number,
            agent = agent_name,
            "checkpoint committed"
        );
        Ok(checkpoint)
    }
}

fn stage_note(status: RunStatus, state: &RunState) -> String {
    match status {
        RunStatus::Drafting => format!("draft v{} created", state.iteration_count),
        RunStatus::SafetyCheck => {
            if state.safety_flags.is_empty() {
                "no safety flags raised".to_string()
            } else {
                format!("safety flags raised: {}", state.safety_flags.join(", "))
            }
        }
        RunStatus::Critiquing => "critique and proposed revision recorded".to_string(),
        other => other.as_str().to_string(),
    }
}
