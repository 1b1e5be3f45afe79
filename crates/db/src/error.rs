use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Run not found: {0}")]
    RunNotFound(Uuid),

    #[error("Corrupt state snapshot for run {run_id} at seq {seq}: {source}")]
    Snapshot {
        run_id: Uuid,
        seq: i64,
        source: serde_json::Error,
    },
}
