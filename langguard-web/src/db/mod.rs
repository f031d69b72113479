//! Artifact store for langguard-web
//!
//! SQLite tables in `langguard.db` under the root folder:
//! - `artifacts`: named blobs keyed by (session, kind)
//! - `pipeline_results`: one serialized `PipelineResult` per session

pub mod artifacts;
pub mod results;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

use crate::models::{ArtifactKind, PipelineResult};

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the artifact and result tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> langguard_common::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artifacts (
            session_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            content BLOB NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (session_id, kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_results (
            session_id TEXT PRIMARY KEY,
            media_kind TEXT NOT NULL,
            result_json TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_artifacts_created_at ON artifacts (created_at)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (artifacts, pipeline_results)");
    Ok(())
}

/// Persist a finished invocation in one transaction
///
/// Either the result and every artifact are stored, or nothing is.
pub async fn save_session_outputs(
    pool: &SqlitePool,
    result: &PipelineResult,
    outputs: &[(ArtifactKind, Vec<u8>)],
) -> langguard_common::Result<()> {
    let session_id = result.session_id.to_string();
    let created_at = result.created_at.to_rfc3339();
    let result_json = serde_json::to_string(result)?;

    let mut tx = pool.begin().await?;

    for (kind, content) in outputs {
        artifacts::save_artifact(&mut *tx, &result.session_id, *kind, content, result.created_at)
            .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO pipeline_results (session_id, media_kind, result_json, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(session_id) DO UPDATE SET
            media_kind = excluded.media_kind,
            result_json = excluded.result_json,
            created_at = excluded.created_at
        "#,
    )
    .bind(&session_id)
    .bind(result.media_kind.as_str())
    .bind(&result_json)
    .bind(&created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        session_id = %session_id,
        artifacts = outputs.len(),
        "Session outputs stored"
    );
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_tables(&pool).await.unwrap();
    pool
}
