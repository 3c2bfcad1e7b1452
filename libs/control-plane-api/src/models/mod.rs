//! API models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extra fields returned by the control plane that the client does not model
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Deployment source kind
pub const SOURCE_GITHUB: &str = "github";

/// Deployment creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeploymentRequest {
    pub name: String,
    pub source: String,
    pub source_config: SourceConfig,
    pub source_revision_config: SourceRevisionConfig,
    pub secrets: Vec<Secret>,
}

/// Where a deployment is built from and how builds are triggered.
///
/// Every field is optional so the same type doubles as a partial patch body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_on_push: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_spec: Option<serde_json::Value>,
}

/// Which ref and config file a revision is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRevisionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_ref: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langgraph_config_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

/// Named secret injected into the deployment environment
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub value: String,
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Partial deployment update.
///
/// Including `source_revision_config` makes the control plane create a new revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchDeploymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_config: Option<SourceConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_revision_config: Option<SourceRevisionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Vec<Secret>>,
}

impl PatchDeploymentRequest {
    /// Whether this patch will trigger a new revision server-side
    pub fn creates_revision(&self) -> bool {
        self.source_revision_config.is_some()
    }
}

/// A deployment as returned by the control plane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub source_config: Option<SourceConfig>,

    #[serde(default)]
    pub source_revision_config: Option<SourceRevisionConfig>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Revision status.
///
/// The control plane does not publish a closed set of values, so this stays a
/// string. Anything containing `FAILED` is terminal failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionStatus(pub String);

impl RevisionStatus {
    pub const DEPLOYED: &'static str = "DEPLOYED";
    pub const FAILED_MARKER: &'static str = "FAILED";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Terminal success
    pub fn is_deployed(&self) -> bool {
        self.0 == Self::DEPLOYED
    }

    /// Terminal failure (`BUILD_FAILED`, `DEPLOY_FAILED`, ...)
    pub fn is_failed(&self) -> bool {
        self.0.contains(Self::FAILED_MARKER)
    }
}

impl fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A build/deploy attempt belonging to a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub id: String,

    pub status: RevisionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{{\"id\":\"{}\",\"status\":\"{}\"}}", self.id, self.status),
        }
    }
}

/// Collection envelope used by list endpoints.
///
/// Order is whatever the control plane returned. Revisions come back newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceList<T> {
    pub resources: Vec<T>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl<T> ResourceList<T> {
    /// First element, which for revisions is the most recently created one
    pub fn into_latest(self) -> Option<T> {
        self.resources.into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// A listener, exposed read-only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listener {
    pub id: String,

    #[serde(flatten)]
    pub extra: Extra,
}

/// Structured error descriptor, `{"error": "HTTP 500", "message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
