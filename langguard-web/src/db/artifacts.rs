//! Artifact blob operations

use chrono::{DateTime, Utc};
use langguard_common::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::models::{ArtifactKind, SessionId};

/// Store (or replace) one artifact on `conn`, usually an open transaction
pub async fn save_artifact(
    conn: &mut SqliteConnection,
    session_id: &SessionId,
    kind: ArtifactKind,
    content: &[u8],
    created_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO artifacts (session_id, kind, content, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(session_id, kind) DO UPDATE SET
            content = excluded.content,
            created_at = excluded.created_at
        "#,
    )
    .bind(session_id.as_str())
    .bind(kind.as_str())
    .bind(content)
    .bind(created_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Load one artifact; `None` if the session never produced it or it expired
pub async fn load_artifact(
    pool: &SqlitePool,
    session_id: &SessionId,
    kind: ArtifactKind,
) -> Result<Option<Vec<u8>>> {
    let row = sqlx::query("SELECT content FROM artifacts WHERE session_id = ? AND kind = ?")
        .bind(session_id.as_str())
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.get::<Vec<u8>, _>("content")))
}

/// Delete artifacts created before `cutoff`, returning the row count
pub async fn delete_artifacts_before(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM artifacts WHERE created_at < ?")
        .bind(cutoff.to_rfc3339())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use chrono::Duration;

    async fn save(pool: &SqlitePool, session: &SessionId, kind: ArtifactKind, content: &[u8]) {
        let mut conn = pool.acquire().await.unwrap();
        save_artifact(&mut conn, session, kind, content, Utc::now()).await.unwrap();
    }

    #[tokio::test]
    async fn save_then_load_replaces_content() {
        let pool = test_pool().await;
        let session = SessionId::new();

        save(&pool, &session, ArtifactKind::Translation, b"first").await;
        save(&pool, &session, ArtifactKind::Translation, b"second").await;

        let loaded = load_artifact(&pool, &session, ArtifactKind::Translation).await.unwrap();
        assert_eq!(loaded.as_deref(), Some(&b"second"[..]));
        assert!(load_artifact(&pool, &session, ArtifactKind::Audio).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_do_not_share_artifacts() {
        let pool = test_pool().await;
        let a = SessionId::new();
        let b = SessionId::new();
        save(&pool, &a, ArtifactKind::Transcript, b"a").await;

        assert!(load_artifact(&pool, &b, ArtifactKind::Transcript).await.unwrap().is_none());
        assert!(load_artifact(&pool, &a, ArtifactKind::Transcript).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn old_artifacts_are_deleted() {
        let pool = test_pool().await;
        let session = SessionId::new();
        save(&pool, &session, ArtifactKind::Audio, b"mp3").await;

        let kept = delete_artifacts_before(&pool, Utc::now() - Duration::hours(1)).await.unwrap();
        assert_eq!(kept, 0);

        let removed = delete_artifacts_before(&pool, Utc::now() + Duration::seconds(1)).await.unwrap();
        assert_eq!(removed, 1);
    }
}
