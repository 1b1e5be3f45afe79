use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::RunState;

/// Immutable record of one pipeline step, the unit of the per-run event log.
///
/// `sequence_number` is assigned by the event store at append time, starting
/// at 0 and increasing by 1 with no gaps. `state_snapshot` is a full copy of
/// the run state so a late subscriber can reconstruct the run from the last
/// checkpoint alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Checkpoint {
    pub run_id: Uuid,
    pub sequence_number: i64,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    pub note: String,
    pub state_snapshot: RunState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_serialization() {
        let checkpoint = Checkpoint {
            run_id: Uuid::new_v4(),
            sequence_number: 3,
            agent_name: "draftsman".to_string(),
            timestamp: Utc::now(),
            note: "draft v1 created".to_string(),
            state_snapshot: RunState::new("test intent"),
        };

        let json = serde_json::to_string(&checkpoint).unwrap();
        assert!(json.contains("\"sequence_number\":3"));
        assert!(json.contains("draftsman"));
        assert!(json.contains("state_snapshot"));

        let back: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, checkpoint);
    }
}
