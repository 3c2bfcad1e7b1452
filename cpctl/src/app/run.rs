//! Deployment lifecycle run

use control_plane_api::Revision;
use serde::Serialize;
use tracing::info;

use crate::app::options::RunOptions;
use crate::errors::ClientError;
use crate::http::client::HttpClient;
use crate::wait::poller::{wait_for_deployment, ShutdownSignal};

/// What a completed run touched
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleReport {
    pub deployment_id: String,
    pub initial_revision_id: String,
    pub patched_revision_id: String,
    pub deleted: bool,
}

/// Create a deployment, wait for it, patch it, wait for the new revision,
/// then delete it.
///
/// Any failure aborts the run; nothing created so far is cleaned up.
pub async fn run(
    client: &HttpClient,
    options: &RunOptions,
    mut shutdown_signal: ShutdownSignal,
) -> Result<LifecycleReport, ClientError> {
    let request = options.deployment.create_request(&options.integration_id);
    let deployment_id = client.create_deployment(&request).await?;

    let initial = latest_revision(client, &deployment_id).await?;
    wait_for_deployment(
        client,
        &deployment_id,
        &initial.id,
        &options.wait,
        &mut shutdown_signal,
    )
    .await?;

    client
        .patch_deployment(&deployment_id, &options.deployment.redeploy_patch())
        .await?;

    let patched = latest_revision(client, &deployment_id).await?;
    wait_for_deployment(
        client,
        &deployment_id,
        &patched.id,
        &options.wait,
        &mut shutdown_signal,
    )
    .await?;

    let deleted = if options.keep_deployment {
        info!("Keeping deployment ID {}", deployment_id);
        false
    } else {
        client.delete_deployment(&deployment_id).await?;
        true
    };

    Ok(LifecycleReport {
        deployment_id,
        initial_revision_id: initial.id,
        patched_revision_id: patched.id,
        deleted,
    })
}

/// Most recent revision of a deployment.
///
/// Takes the first entry as returned; the control plane lists newest first.
pub async fn latest_revision(
    client: &HttpClient,
    deployment_id: &str,
) -> Result<Revision, ClientError> {
    let revisions = client.list_revisions(deployment_id).await?;
    let latest = revisions
        .into_latest()
        .ok_or_else(|| ClientError::NoRevisions(deployment_id.to_string()))?;

    info!(
        "Latest revision for deployment ID {} is {} ({})",
        deployment_id, latest.id, latest.status
    );
    Ok(latest)
}
