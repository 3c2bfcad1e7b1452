//! Client configuration
//!
//! Everything is read once at startup into explicit structs that are handed to
//! the client, rather than consulted as globals.

use std::time::Duration;

use control_plane_api::{
    CreateDeploymentRequest, PatchDeploymentRequest, Secret, SourceConfig, SourceRevisionConfig,
    SOURCE_GITHUB,
};
use secrecy::SecretString;
use url::Url;

use crate::errors::ClientError;
use crate::logs::LogLevel;

pub const ENV_HOST: &str = "CONTROL_PLANE_HOST";
pub const ENV_API_KEY: &str = "LANGSMITH_API_KEY";
pub const ENV_INTEGRATION_ID: &str = "INTEGRATION_ID";
pub const ENV_MAX_WAIT_SECS: &str = "CPCTL_MAX_WAIT_SECS";
pub const ENV_POLL_INTERVAL_SECS: &str = "CPCTL_POLL_INTERVAL_SECS";
pub const ENV_LOG_LEVEL: &str = "CPCTL_LOG_LEVEL";
pub const ENV_DEPLOYMENT_NAME: &str = "CPCTL_DEPLOYMENT_NAME";
pub const ENV_REPO_URL: &str = "CPCTL_REPO_URL";
pub const ENV_REPO_REF: &str = "CPCTL_REPO_REF";
pub const ENV_CONFIG_PATH: &str = "CPCTL_CONFIG_PATH";
pub const ENV_SECRET_NAMES: &str = "CPCTL_SECRET_NAMES";

/// 30 minutes
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(1800);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Connection and polling configuration for the control-plane client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Control-plane base URL, without a trailing slash
    pub host: String,

    /// Sent as `X-Api-Key` on every request
    pub api_key: SecretString,

    /// Source integration used when creating deployments
    pub integration_id: Option<String>,

    /// Upper bound on how long to wait for a revision
    pub max_wait: Duration,

    /// Delay between revision polls
    pub poll_interval: Duration,

    pub log_level: LogLevel,
}

impl ClientConfig {
    pub fn new(host: &str, api_key: impl Into<String>) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key.into()),
            integration_id: None,
            max_wait: DEFAULT_MAX_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            log_level: LogLevel::default(),
        }
    }

    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = required(&lookup, ENV_HOST)?;
        Url::parse(&host)
            .map_err(|e| ClientError::ConfigError(format!("{} is not a valid URL: {}", ENV_HOST, e)))?;

        let mut config = Self::new(&host, required(&lookup, ENV_API_KEY)?);
        config.integration_id = optional(&lookup, ENV_INTEGRATION_ID);

        if let Some(secs) = parse_secs(&lookup, ENV_MAX_WAIT_SECS)? {
            config.max_wait = secs;
        }
        if let Some(secs) = parse_secs(&lookup, ENV_POLL_INTERVAL_SECS)? {
            config.poll_interval = secs;
        }
        if let Some(level) = optional(&lookup, ENV_LOG_LEVEL) {
            config.log_level = level.parse().map_err(ClientError::ConfigError)?;
        }

        Ok(config)
    }

    /// Integration ID, which only deployment creation needs
    pub fn require_integration_id(&self) -> Result<&str, ClientError> {
        self.integration_id
            .as_deref()
            .ok_or_else(|| ClientError::ConfigError(format!("{} is not set", ENV_INTEGRATION_ID)))
    }
}

/// What the lifecycle run deploys
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentSettings {
    pub name: String,
    pub repo_url: String,
    pub repo_ref: String,

    /// Path to the declarative graph config inside the repository
    pub config_path: String,

    pub deployment_type: String,
    pub build_on_push: bool,
    pub secrets: Vec<Secret>,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            name: "my_deployment".to_string(),
            repo_url: "https://github.com/langchain-ai/langgraph-example".to_string(),
            repo_ref: "main".to_string(),
            config_path: "langgraph.json".to_string(),
            deployment_type: "dev".to_string(),
            build_on_push: false,
            secrets: Vec::new(),
        }
    }
}

impl DeploymentSettings {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever the lookup provides.
    ///
    /// `CPCTL_SECRET_NAMES` lists variable names; each named variable must be set
    /// and its value becomes a deployment secret of the same name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(name) = optional(&lookup, ENV_DEPLOYMENT_NAME) {
            settings.name = name;
        }
        if let Some(repo_url) = optional(&lookup, ENV_REPO_URL) {
            settings.repo_url = repo_url;
        }
        if let Some(repo_ref) = optional(&lookup, ENV_REPO_REF) {
            settings.repo_ref = repo_ref;
        }
        if let Some(config_path) = optional(&lookup, ENV_CONFIG_PATH) {
            settings.config_path = config_path;
        }

        if let Some(names) = optional(&lookup, ENV_SECRET_NAMES) {
            for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                let value = lookup(name).ok_or_else(|| {
                    ClientError::ConfigError(format!(
                        "{} lists {} but it is not set",
                        ENV_SECRET_NAMES, name
                    ))
                })?;
                settings.secrets.push(Secret {
                    name: name.to_string(),
                    value,
                });
            }
        }

        Ok(settings)
    }

    /// Creation body for a GitHub-sourced deployment
    pub fn create_request(&self, integration_id: &str) -> CreateDeploymentRequest {
        CreateDeploymentRequest {
            name: self.name.clone(),
            source: SOURCE_GITHUB.to_string(),
            source_config: SourceConfig {
                integration_id: Some(integration_id.to_string()),
                repo_url: Some(self.repo_url.clone()),
                deployment_type: Some(self.deployment_type.clone()),
                build_on_push: Some(self.build_on_push),
                custom_url: None,
                resource_spec: None,
            },
            source_revision_config: SourceRevisionConfig {
                repo_ref: Some(self.repo_ref.clone()),
                langgraph_config_path: Some(self.config_path.clone()),
                image_uri: None,
            },
            secrets: self.secrets.clone(),
        }
    }

    /// Patch that turns on build-on-push and rebuilds from the configured ref
    pub fn redeploy_patch(&self) -> PatchDeploymentRequest {
        PatchDeploymentRequest {
            source_config: Some(SourceConfig {
                build_on_push: Some(true),
                ..Default::default()
            }),
            source_revision_config: Some(SourceRevisionConfig {
                repo_ref: Some(self.repo_ref.clone()),
                langgraph_config_path: Some(self.config_path.clone()),
                image_uri: None,
            }),
            secrets: None,
        }
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| ClientError::ConfigError(format!("{} is not set", key)))
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .map(|raw| {
            raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                ClientError::ConfigError(format!("{} must be a number of seconds: {}", key, e))
            })
        })
        .transpose()
}
