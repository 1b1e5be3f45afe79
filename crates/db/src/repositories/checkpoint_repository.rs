use foundry_core::{Checkpoint, RunState};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::CheckpointRow;

/// Append-only event store for run checkpoints.
///
/// Sequence numbers are assigned inside the INSERT statement, so a single
/// append is atomic; writers for the same run are additionally serialized
/// by the orchestrator's per-run lock.
#[derive(Clone)]
pub struct CheckpointRepository {
    pool: SqlitePool,
}

impl CheckpointRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new checkpoint and return it with its assigned sequence
    /// number (0 for the first append of a run).
    pub async fn append(
        &self,
        run_id: Uuid,
        agent_name: &str,
        note: &str,
        state: &RunState,
    ) -> Result<Checkpoint, DbError> {
        let snapshot_json = serde_json::to_string(state).map_err(|source| DbError::Snapshot {
            run_id,
            seq: -1,
            source,
        })?;
        let created_at = chrono::Utc::now().timestamp();

        let row: CheckpointRow = sqlx::query_as(
            r#"
            INSERT INTO run_checkpoints (run_id, seq, agent_name, note, state_snapshot, created_at)
            VALUES (
                ?1,
                (SELECT COALESCE(MAX(seq) + 1, 0) FROM run_checkpoints WHERE run_id = ?1),
                ?2, ?3, ?4, ?5
            )
            RETURNING run_id, seq, agent_name, note, state_snapshot, created_at
            "#,
        )
        .bind(run_id.to_string())
        .bind(agent_name)
        .bind(note)
        .bind(&snapshot_json)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    /// All checkpoints of a run in append order.
    pub async fn history(&self, run_id: Uuid) -> Result<Vec<Checkpoint>, DbError> {
        let rows: Vec<CheckpointRow> = sqlx::query_as(
            r#"
            SELECT run_id, seq, agent_name, note, state_snapshot, created_at
            FROM run_checkpoints
            WHERE run_id = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(run_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(DbError::RunNotFound(run_id));
        }

        rows.into_iter().map(|r| r.into_domain()).collect()
    }

    /// Checkpoints with a sequence number greater than `seq`, append order.
    pub async fn history_after(&self, run_id: Uuid, seq: i64) -> Result<Vec<Checkpoint>, DbError> {
        let rows: Vec<CheckpointRow> = sqlx::query_as(
            r#"
            SELECT run_id, seq, agent_name, note, state_snapshot, created_at
            FROM run_checkpoints
            WHERE run_id = ? AND seq > ?
            ORDER BY seq ASC
            "#,
        )
        .bind(run_id.to_string())
        .bind(seq)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_domain()).collect()
    }

    /// The most recent checkpoint of a run.
    pub async fn latest(&self, run_id: Uuid) -> Result<Checkpoint, DbError> {
        let row: Option<CheckpointRow> = sqlx::query_as(
            r#"
            SELECT run_id, seq, agent_name, note, state_snapshot, created_at
            FROM run_checkpoints
            WHERE run_id = ?
            ORDER BY seq DESC
            LIMIT 1
            "#,
        )
        .bind(run_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => r.into_domain(),
            None => Err(DbError::RunNotFound(run_id)),
        }
    }
}
