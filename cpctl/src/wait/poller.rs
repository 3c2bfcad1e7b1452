//! Revision poller
//!
//! Fixed-interval polling of a revision until it is `DEPLOYED`, fails, or the
//! wait budget runs out. No backoff and no jitter. The whole wait races a
//! shutdown future so it can be abandoned, even mid-request.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use control_plane_api::Revision;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL};
use crate::errors::ClientError;

/// Resolves when the caller wants in-flight waits abandoned
pub type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A shutdown signal that never fires
pub fn no_shutdown() -> ShutdownSignal {
    Box::pin(std::future::pending())
}

/// Await a signal listener. If the listener could not be installed, log it
/// and never resolve, so a broken handler is not mistaken for a shutdown.
pub async fn signal_or_never<F, E>(listener: F, name: &str)
where
    F: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    match listener.await {
        Ok(()) => info!("{} received, shutting down...", name),
        Err(e) => {
            error!("Unable to listen for {}: {}", name, e);
            std::future::pending::<()>().await;
        }
    }
}

/// Anything that can fetch the current state of a revision
#[async_trait]
pub trait RevisionSource: Send + Sync {
    async fn get_revision(
        &self,
        deployment_id: &str,
        revision_id: &str,
    ) -> Result<Revision, ClientError>;
}

/// Poller options
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Give up once this much time has passed since the first poll
    pub max_wait: Duration,

    /// Delay between polls
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            max_wait: DEFAULT_MAX_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&ClientConfig> for WaitOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_wait: config.max_wait,
            poll_interval: config.poll_interval,
        }
    }
}

/// Wait for a revision to reach `DEPLOYED`.
///
/// Returns the deployed revision. Fails immediately on any `*FAILED*` status
/// or on a fetch error; fails with [`ClientError::Timeout`] carrying the last
/// observed revision once `max_wait` has elapsed. `shutdown` is watched for the
/// whole wait, in-flight fetches included, and yields [`ClientError::Cancelled`].
pub async fn wait_for_deployment<S>(
    source: &S,
    deployment_id: &str,
    revision_id: &str,
    options: &WaitOptions,
    shutdown: &mut ShutdownSignal,
) -> Result<Revision, ClientError>
where
    S: RevisionSource + ?Sized,
{
    tokio::select! {
        _ = shutdown.as_mut() => {
            warn!("Shutdown requested while waiting for revision ID {}", revision_id);
            Err(ClientError::Cancelled {
                revision_id: revision_id.to_string(),
            })
        }
        result = poll_until_terminal(source, deployment_id, revision_id, options) => result,
    }
}

async fn poll_until_terminal<S>(
    source: &S,
    deployment_id: &str,
    revision_id: &str,
    options: &WaitOptions,
) -> Result<Revision, ClientError>
where
    S: RevisionSource + ?Sized,
{
    let start = Instant::now();
    let mut last_seen: Option<Revision> = None;

    while start.elapsed() < options.max_wait {
        let revision = source.get_revision(deployment_id, revision_id).await?;
        debug!("Revision ID {} status: {}", revision_id, revision.status);

        if revision.status.is_deployed() {
            info!("Revision ID {} is DEPLOYED", revision_id);
            return Ok(revision);
        }

        if revision.status.is_failed() {
            error!("Revision ID {} failed with status {}", revision_id, revision.status);
            return Err(ClientError::RevisionFailed {
                revision_id: revision_id.to_string(),
                revision: Box::new(revision),
            });
        }

        info!(
            "Waiting for revision ID {} to be DEPLOYED (currently {})...",
            revision_id, revision.status
        );
        last_seen = Some(revision);
        tokio::time::sleep(options.poll_interval).await;
    }

    error!(
        "Timed out after {:?} waiting for revision ID {}",
        options.max_wait, revision_id
    );
    Err(ClientError::Timeout {
        revision_id: revision_id.to_string(),
        revision: last_seen.map(Box::new),
    })
}

/// Run `future` to completion unless `shutdown` resolves first, in which case
/// the future is dropped and [`ClientError::Interrupted`] is returned.
pub async fn until_shutdown<F, T>(
    future: F,
    mut shutdown: ShutdownSignal,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        _ = shutdown.as_mut() => {
            warn!("Shutdown requested, abandoning in-flight work");
            Err(ClientError::Interrupted)
        }
        result = future => result,
    }
}
