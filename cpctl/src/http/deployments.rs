//! Deployment and revision API client

use async_trait::async_trait;
use control_plane_api::{
    CreateDeploymentRequest, Deployment, PatchDeploymentRequest, ResourceList, Revision,
};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::info;

use crate::errors::ClientError;
use crate::http::client::HttpClient;
use crate::wait::poller::RevisionSource;

/// Creation response; only the assigned ID is needed
#[derive(Debug, Clone, Deserialize)]
struct CreatedDeployment {
    id: String,
}

impl HttpClient {
    /// Create a deployment and return its ID
    pub async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<String, ClientError> {
        let created: CreatedDeployment = self
            .post(
                "/v2/deployments",
                request,
                StatusCode::CREATED,
                "Failed to create deployment",
            )
            .await?;

        info!("Created deployment {} ({})", request.name, created.id);
        Ok(created.id)
    }

    /// Get a deployment
    pub async fn get_deployment(&self, deployment_id: &str) -> Result<Deployment, ClientError> {
        let path = format!("/v2/deployments/{}", deployment_id);
        let context = format!("Failed to get deployment ID {}", deployment_id);
        self.get(&path, &context).await
    }

    /// List revisions, newest first as ordered by the control plane
    pub async fn list_revisions(
        &self,
        deployment_id: &str,
    ) -> Result<ResourceList<Revision>, ClientError> {
        let path = format!("/v2/deployments/{}/revisions", deployment_id);
        let context = format!("Failed to list revisions for deployment ID {}", deployment_id);
        self.get(&path, &context).await
    }

    /// Get a single revision
    pub async fn get_revision(
        &self,
        deployment_id: &str,
        revision_id: &str,
    ) -> Result<Revision, ClientError> {
        let path = format!("/v2/deployments/{}/revisions/{}", deployment_id, revision_id);
        let context = format!("Failed to get revision ID {}", revision_id);
        self.get(&path, &context).await
    }

    /// Apply a partial update.
    ///
    /// A patch carrying `source_revision_config` makes the control plane start a new revision.
    pub async fn patch_deployment(
        &self,
        deployment_id: &str,
        request: &PatchDeploymentRequest,
    ) -> Result<(), ClientError> {
        let path = format!("/v2/deployments/{}", deployment_id);
        self.patch(&path, request, "Failed to patch deployment").await?;

        if request.creates_revision() {
            info!("Patched deployment ID {}, new revision requested", deployment_id);
        } else {
            info!("Patched deployment ID {}", deployment_id);
        }
        Ok(())
    }

    /// Delete a deployment
    pub async fn delete_deployment(&self, deployment_id: &str) -> Result<(), ClientError> {
        let path = format!("/v2/deployments/{}", deployment_id);
        let context = format!("Failed to delete deployment ID {}", deployment_id);
        self.delete(&path, &context).await?;

        info!("Deployment ID {} deleted", deployment_id);
        Ok(())
    }
}

#[async_trait]
impl RevisionSource for HttpClient {
    async fn get_revision(
        &self,
        deployment_id: &str,
        revision_id: &str,
    ) -> Result<Revision, ClientError> {
        HttpClient::get_revision(self, deployment_id, revision_id).await
    }
}
