//! Build metadata

use serde::{Deserialize, Serialize};

/// What `cpctl --version` prints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,

    /// `git describe` of the source tree, `-dirty` when built with local changes
    pub git_revision: String,

    /// RFC 3339
    pub build_time: String,

    pub target: String,
}

pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_revision: option_env!("CPCTL_GIT_REVISION").unwrap_or("unknown").to_string(),
        build_time: option_env!("CPCTL_BUILD_TIME").unwrap_or("unknown").to_string(),
        target: option_env!("CPCTL_TARGET").unwrap_or("unknown").to_string(),
    }
}

/// User agent sent with every control-plane request, e.g. `cpctl/0.1.0 (x86_64-unknown-linux-gnu)`
pub fn user_agent() -> String {
    let info = version_info();
    format!("cpctl/{} ({})", info.version, info.target)
}
