//! Lifecycle run options

use crate::config::{ClientConfig, DeploymentSettings};
use crate::errors::ClientError;
use crate::wait::poller::WaitOptions;

/// Options for a full create → patch → delete run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Source integration the deployment is created under
    pub integration_id: String,

    /// What to deploy
    pub deployment: DeploymentSettings,

    /// Revision wait behaviour
    pub wait: WaitOptions,

    /// Leave the deployment in place at the end of the run
    pub keep_deployment: bool,
}

impl RunOptions {
    pub fn new(config: &ClientConfig, deployment: DeploymentSettings) -> Result<Self, ClientError> {
        Ok(Self {
            integration_id: config.require_integration_id()?.to_string(),
            deployment,
            wait: WaitOptions::from(config),
            keep_deployment: false,
        })
    }
}
