//! Artifact retention
//!
//! Periodically deletes stored results, artifacts and upload files older than
//! the configured TTL. Stops when the shutdown token is cancelled.

use crate::db;
use chrono::Utc;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What one sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub results: u64,
    pub artifacts: u64,
    pub files: u64,
}

/// Delete everything older than `ttl`
pub async fn sweep_once(
    pool: &SqlitePool,
    upload_dir: &Path,
    ttl: Duration,
) -> langguard_common::Result<SweepReport> {
    let age = chrono::Duration::from_std(ttl)
        .map_err(|e| langguard_common::Error::Config(format!("Invalid TTL: {}", e)))?;
    let cutoff = Utc::now() - age;

    let results = db::results::delete_results_before(pool, cutoff).await?;
    let artifacts = db::artifacts::delete_artifacts_before(pool, cutoff).await?;
    let files = remove_stale_files(upload_dir, ttl).await?;

    Ok(SweepReport {
        results,
        artifacts,
        files,
    })
}

async fn remove_stale_files(dir: &Path, ttl: Duration) -> langguard_common::Result<u64> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());

        if age.is_some_and(|age| age > ttl) {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove stale upload"),
            }
        }
    }

    Ok(removed)
}

/// Spawn the periodic sweeper
///
/// Returns `None` when the TTL is disabled.
pub fn spawn_retention_sweeper(
    pool: SqlitePool,
    upload_dir: PathBuf,
    ttl: Option<Duration>,
    interval: Duration,
    shutdown: CancellationToken,
) -> Option<JoinHandle<()>> {
    let ttl = match ttl {
        Some(ttl) => ttl,
        None => {
            info!("Artifact retention disabled");
            return None;
        }
    };

    info!(ttl_secs = ttl.as_secs(), interval_secs = interval.as_secs(), "Starting retention sweeper");

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Retention sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match sweep_once(&pool, &upload_dir, ttl).await {
                        Ok(report) if report != SweepReport::default() => {
                            info!(
                                results = report.results,
                                artifacts = report.artifacts,
                                files = report.files,
                                "Expired artifacts removed"
                            );
                        }
                        Ok(_) => debug!("Retention sweep found nothing to remove"),
                        Err(e) => warn!(error = %e, "Retention sweep failed"),
                    }
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::{ArtifactKind, SessionId};

    async fn store_artifact(pool: &sqlx::SqlitePool, kind: ArtifactKind) {
        let mut conn = pool.acquire().await.unwrap();
        db::artifacts::save_artifact(&mut conn, &SessionId::new(), kind, b"x", chrono::Utc::now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fresh_data_survives_a_sweep() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("abc_talk.mp3"), b"x").await.unwrap();
        store_artifact(&pool, ArtifactKind::Audio).await;

        let report = sweep_once(&pool, dir.path(), Duration::from_secs(3600)).await.unwrap();
        assert_eq!(report, SweepReport::default());
        assert!(dir.path().join("abc_talk.mp3").exists());
    }

    #[tokio::test]
    async fn zero_age_sweep_removes_everything() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("abc.txt"), b"x").await.unwrap();
        store_artifact(&pool, ArtifactKind::Transcript).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let report = sweep_once(&pool, dir.path(), Duration::from_millis(1)).await.unwrap();
        assert_eq!(report.artifacts, 1);
        assert_eq!(report.files, 1);
        assert!(!dir.path().join("abc.txt").exists());
    }

    #[tokio::test]
    async fn missing_upload_dir_is_not_an_error() {
        let pool = test_pool().await;
        let report = sweep_once(&pool, Path::new("/nonexistent/uploads"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(report.files, 0);
    }

    #[tokio::test]
    async fn sweeper_stops_on_shutdown() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();

        let handle = spawn_retention_sweeper(
            pool,
            dir.path().to_path_buf(),
            Some(Duration::from_secs(60)),
            Duration::from_millis(10),
            token.clone(),
        )
        .unwrap();

        token.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn disabled_ttl_spawns_nothing() {
        let pool = test_pool().await;
        let handle = spawn_retention_sweeper(
            pool,
            PathBuf::from("/tmp"),
            None,
            Duration::from_secs(1),
            CancellationToken::new(),
        );
        assert!(handle.is_none());
    }
}
