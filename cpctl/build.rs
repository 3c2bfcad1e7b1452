//! Embeds the source revision and build timestamp for `cpctl --version`.
//!
//! Honours `SOURCE_DATE_EPOCH` so packaged builds are reproducible.

use std::env;
use std::process::Command;

use chrono::{DateTime, Utc};

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=10"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string()).filter(|s| !s.is_empty())
}

fn build_timestamp() -> DateTime<Utc> {
    env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|epoch| epoch.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}

fn main() {
    let revision = git_describe().unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=CPCTL_GIT_REVISION={}", revision);
    println!("cargo:rustc-env=CPCTL_BUILD_TIME={}", build_timestamp().to_rfc3339());
    println!(
        "cargo:rustc-env=CPCTL_TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
