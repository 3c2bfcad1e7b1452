//! Revision poller tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cpctl::errors::ClientError;
use cpctl::models::{Revision, RevisionStatus};
use cpctl::wait::poller::{
    no_shutdown, signal_or_never, until_shutdown, wait_for_deployment, RevisionSource,
    ShutdownSignal, WaitOptions,
};
use tokio::time::Instant;

/// Replays a fixed status sequence, repeating the last status once exhausted
struct ScriptedSource {
    statuses: Vec<&'static str>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    fn new(statuses: &[&'static str]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            fetches: AtomicUsize::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RevisionSource for ScriptedSource {
    async fn get_revision(
        &self,
        _deployment_id: &str,
        revision_id: &str,
    ) -> Result<Revision, ClientError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        let status = self.statuses[n.min(self.statuses.len() - 1)];

        Ok(Revision {
            id: revision_id.to_string(),
            status: RevisionStatus::new(status),
            created_at: None,
            extra: Default::default(),
        })
    }
}

/// Always fails the fetch
struct BrokenSource;

#[async_trait]
impl RevisionSource for BrokenSource {
    async fn get_revision(
        &self,
        _deployment_id: &str,
        revision_id: &str,
    ) -> Result<Revision, ClientError> {
        Err(ClientError::ConfigError(format!("cannot fetch {revision_id}")))
    }
}

async fn wait<S: RevisionSource>(
    source: &S,
    revision_id: &str,
    options: WaitOptions,
) -> Result<Revision, ClientError> {
    wait_for_deployment(source, "dep-1", revision_id, &options, &mut no_shutdown()).await
}

/// A fetch that never completes, like a request to an unresponsive host
struct HangingSource;

#[async_trait]
impl RevisionSource for HangingSource {
    async fn get_revision(
        &self,
        _deployment_id: &str,
        _revision_id: &str,
    ) -> Result<Revision, ClientError> {
        std::future::pending().await
    }
}

fn options(max_wait_secs: u64, interval_secs: u64) -> WaitOptions {
    WaitOptions {
        max_wait: Duration::from_secs(max_wait_secs),
        poll_interval: Duration::from_secs(interval_secs),
    }
}

#[test]
fn test_default_wait_options() {
    let options = WaitOptions::default();
    assert_eq!(options.max_wait, Duration::from_secs(1800));
    assert_eq!(options.poll_interval, Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_wait_until_deployed() {
    let source = ScriptedSource::new(&["PENDING", "PENDING", "DEPLOYED"]);

    let revision = wait(&source, "rev-1", options(1800, 0)).await.unwrap();

    assert!(revision.status.is_deployed());
    assert_eq!(source.fetches(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_already_deployed_returns_without_sleeping() {
    let source = ScriptedSource::new(&["DEPLOYED"]);
    let start = Instant::now();

    wait(&source, "rev-2", options(1800, 60)).await.unwrap();

    assert_eq!(source.fetches(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_failure_stops_immediately() {
    let source = ScriptedSource::new(&["PENDING", "FAILED", "DEPLOYED"]);
    let start = Instant::now();

    let err = wait(&source, "rev-1", options(1800, 60)).await.unwrap_err();

    match err {
        ClientError::RevisionFailed { revision_id, revision } => {
            assert_eq!(revision_id, "rev-1");
            assert_eq!(revision.status.as_str(), "FAILED");
        }
        other => panic!("expected RevisionFailed, got {other:?}"),
    }
    assert_eq!(source.fetches(), 2);
    // Only the single sleep between the two polls
    assert!(start.elapsed() >= Duration::from_secs(60));
    assert!(start.elapsed() < Duration::from_secs(120));
}

#[tokio::test(start_paused = true)]
async fn test_failure_on_first_poll() {
    let source = ScriptedSource::new(&["BUILD_FAILED"]);

    let err = wait(&source, "rev-1", options(1800, 60)).await.unwrap_err();

    assert!(matches!(err, ClientError::RevisionFailed { .. }));
    assert!(err.to_string().contains("BUILD_FAILED"));
    assert_eq!(source.fetches(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_when_never_terminal() {
    let source = ScriptedSource::new(&["PENDING"]);

    let err = wait(&source, "rev-1", options(270, 60)).await.unwrap_err();

    match err {
        ClientError::Timeout { revision_id, revision } => {
            assert_eq!(revision_id, "rev-1");
            assert_eq!(revision.unwrap().status.as_str(), "PENDING");
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
    // Polls at 0, 60, 120, 180 and 240 seconds; the next would be past the budget
    assert_eq!(source.fetches(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_times_out_without_fetching() {
    let source = ScriptedSource::new(&["DEPLOYED"]);

    let err = wait(&source, "rev-1", options(0, 60)).await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout { revision: None, .. }));
    assert_eq!(source.fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_propagates() {
    let err = wait(&BrokenSource, "rev-1", options(1800, 60)).await.unwrap_err();

    assert!(err.to_string().contains("cannot fetch rev-1"));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_wait() {
    let source = ScriptedSource::new(&["PENDING"]);
    let mut shutdown: ShutdownSignal = Box::pin(tokio::time::sleep(Duration::from_secs(90)));

    let err = wait_for_deployment(&source, "dep-1", "rev-1", &options(1800, 60), &mut shutdown)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled { .. }));
    // Polls at 0 and 60 seconds, then shutdown fires during the second sleep
    assert_eq!(source.fetches(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_hung_fetch() {
    let mut shutdown: ShutdownSignal = Box::pin(tokio::time::sleep(Duration::from_secs(1)));
    let start = Instant::now();

    let opts = options(1800, 60);
    let wait = wait_for_deployment(
        &HangingSource,
        "dep-1",
        "rev-1",
        &opts,
        &mut shutdown,
    );
    let err = tokio::time::timeout(Duration::from_secs(600), wait)
        .await
        .expect("wait should return once shutdown fires")
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled { ref revision_id } if revision_id == "rev-1"));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_until_shutdown_drops_pending_work() {
    let shutdown: ShutdownSignal = Box::pin(tokio::time::sleep(Duration::from_secs(1)));
    let work = std::future::pending::<Result<(), ClientError>>();

    let err = tokio::time::timeout(Duration::from_secs(600), until_shutdown(work, shutdown))
        .await
        .expect("shutdown should interrupt the work")
        .unwrap_err();

    assert!(matches!(err, ClientError::Interrupted));
}

#[tokio::test(start_paused = true)]
async fn test_until_shutdown_passes_result_through() {
    let result = until_shutdown(async { Ok::<_, ClientError>(7) }, no_shutdown()).await;

    assert_eq!(result.unwrap(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_failed_signal_listener_never_fires() {
    let listener = async { Err::<(), _>("handler unavailable") };

    let fired = tokio::time::timeout(
        Duration::from_secs(600),
        signal_or_never(listener, "Ctrl+C"),
    )
    .await;

    assert!(fired.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_signal_listener_fires() {
    let listener = async { Ok::<(), &str>(()) };

    signal_or_never(listener, "Ctrl+C").await;
}
