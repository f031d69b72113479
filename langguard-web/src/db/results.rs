//! Pipeline result records

use chrono::{DateTime, Utc};
use langguard_common::Result;
use sqlx::{Row, SqlitePool};

use crate::models::{PipelineResult, SessionId};

/// Load the stored result of a session
pub async fn load_result(pool: &SqlitePool, session_id: &SessionId) -> Result<Option<PipelineResult>> {
    let row = sqlx::query("SELECT result_json FROM pipeline_results WHERE session_id = ?")
        .bind(session_id.as_str())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let json: String = row.get("result_json");
            Ok(Some(serde_json::from_str(&json)?))
        }
        None => Ok(None),
    }
}

/// Delete results created before `cutoff`, returning the row count
pub async fn delete_results_before(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM pipeline_results WHERE created_at < ?")
        .bind(cutoff.to_rfc3339())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
