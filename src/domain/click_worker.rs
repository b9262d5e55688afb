//! Background worker that persists click events.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::NewClick;
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;

/// Number of retries after the first failed insert.
const MAX_RETRIES: usize = 3;

/// Drains the click channel until every sender is dropped.
///
/// Up to `concurrency` inserts run at the same time. Each insert is retried with
/// exponential backoff; a click that still fails is logged and dropped. Failures
/// never reach the request that produced the click.
pub async fn run_click_worker<S>(
    mut rx: mpsc::Receiver<ClickEvent>,
    stats_repository: Arc<S>,
    concurrency: usize,
) where
    S: StatsRepository + ?Sized + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = stats_repository.clone();

        tokio::spawn(async move {
            persist_click(repository.as_ref(), event).await;
            drop(permit);
        });
    }

    // Wait for in-flight inserts before returning.
    let _ = permits.acquire_many(concurrency.max(1) as u32).await;
    debug!("Click worker stopped");
}

/// Persists one click with retry. Returns whether the click was stored.
pub async fn persist_click<S>(repository: &S, event: ClickEvent) -> bool
where
    S: StatsRepository + ?Sized,
{
    let code = event.code.clone();
    let new_click: NewClick = event.into();

    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(std::time::Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::start(
        strategy,
        || {
            let new_click = new_click.clone();
            let code = code.clone();
            async move {
                repository.record_click(new_click).await.map_err(|e| {
                    warn!(code = %code, error = %e, "Click insert failed");
                    e
                })
            }
        },
        is_transient,
    )
    .await;

    match result {
        Ok(click) => {
            debug!(code = %code, click_id = click.id, "Click recorded");
            true
        }
        // The link was deleted between resolve and insert.
        Err(AppError::Validation { .. }) | Err(AppError::NotFound { .. }) => {
            debug!(code = %code, "Dropping click for missing link");
            false
        }
        Err(e) => {
            error!(code = %code, error = %e, "Dropping click after retries");
            false
        }
    }
}

fn is_transient(e: &AppError) -> bool {
    !matches!(e, AppError::Validation { .. } | AppError::NotFound { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Click;
    use crate::domain::repositories::MockStatsRepository;
    use chrono::Utc;
    use serde_json::json;

    fn event(link_id: i64) -> ClickEvent {
        ClickEvent::new(
            link_id,
            "abc123".to_string(),
            Some("10.0.0.1".to_string()),
            Some("TestBot/1.0"),
            None,
        )
    }

    #[tokio::test]
    async fn test_persist_click_success() {
        let mut mock_repo = MockStatsRepository::new();
        mock_repo
            .expect_record_click()
            .withf(|c| c.link_id == 5 && c.ip.as_deref() == Some("10.0.0.1"))
            .times(1)
            .returning(|c| Ok(Click::new(1, c.link_id, Utc::now(), None, None, c.ip)));

        assert!(persist_click(&mock_repo, event(5)).await);
    }

    #[tokio::test]
    async fn test_persist_click_retries_then_gives_up() {
        let mut mock_repo = MockStatsRepository::new();
        mock_repo
            .expect_record_click()
            .times(MAX_RETRIES + 1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        assert!(!persist_click(&mock_repo, event(5)).await);
    }

    #[tokio::test]
    async fn test_persist_click_for_deleted_link_is_not_retried() {
        let mut mock_repo = MockStatsRepository::new();
        mock_repo
            .expect_record_click()
            .times(1)
            .returning(|_| Err(AppError::bad_request("Link no longer exists", json!({}))));

        assert!(!persist_click(&mock_repo, event(5)).await);
    }

    #[tokio::test]
    async fn test_worker_drains_channel_and_stops() {
        let mut mock_repo = MockStatsRepository::new();
        mock_repo
            .expect_record_click()
            .times(3)
            .returning(|c| Ok(Click::new(1, c.link_id, Utc::now(), None, None, None)));

        let (tx, rx) = mpsc::channel(10);
        for id in 1..=3 {
            tx.send(event(id)).await.unwrap();
        }
        drop(tx);

        run_click_worker(rx, Arc::new(mock_repo), 2).await;
    }
}
