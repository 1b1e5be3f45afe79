use chrono::{DateTime, TimeZone, Utc};
use foundry_core::Checkpoint;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckpointRow {
    pub run_id: String,
    pub seq: i64,
    pub agent_name: String,
    pub note: String,
    pub state_snapshot: String,
    pub created_at: i64,
}

impl CheckpointRow {
    /// Convert a stored row into the domain checkpoint.
    ///
    /// A snapshot that fails to deserialize is surfaced as an error rather
    /// than replaced with a default: the log is the source of truth and a
    /// silently empty state would be worse than a loud failure.
    pub fn into_domain(self) -> Result<Checkpoint, DbError> {
        let run_id = Uuid::parse_str(&self.run_id).unwrap_or_default();
        let state_snapshot =
            serde_json::from_str(&self.state_snapshot).map_err(|source| DbError::Snapshot {
                run_id,
                seq: self.seq,
                source,
            })?;

        Ok(Checkpoint {
            run_id,
            sequence_number: self.seq,
            agent_name: self.agent_name,
            timestamp: timestamp_to_datetime(self.created_at),
            note: self.note,
            state_snapshot,
        })
    }
}

fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).single().unwrap_or_default()
}
