//! Console configuration stored in `kops-console.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::cluster::ClusterDefinition;
use crate::io::desktop::{default_browser_command, default_clipboard_command};

pub const DEFAULT_CONFIG_PATH: &str = "kops-console.toml";

/// Console configuration (TOML).
///
/// Missing fields default to values that work for a gossip-based
/// (`*.k8s.local`) cluster in `eu-west-2`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Fixed cluster name passed to every provisioning call.
    pub cluster_name: String,

    /// Conventional bucket holding the provisioning tool's state.
    pub state_bucket: String,

    /// Definition used on startup and whenever a cluster is (re)defined.
    pub defaults: ClusterDefinition,

    pub tools: ToolsConfig,

    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub kops: String,
    pub kubectl: String,
    pub aws: String,
    /// Reads the text to copy on stdin.
    pub clipboard: Vec<String>,
    /// Receives the URL as its final argument.
    pub browser: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub manifest_url: String,
    /// Dashboard address as served through `kubectl proxy`.
    pub proxy_url: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            cluster_name: "console.k8s.local".to_string(),
            state_bucket: "kops-console-state-store".to_string(),
            defaults: ClusterDefinition::default(),
            tools: ToolsConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            kops: "kops".to_string(),
            kubectl: "kubectl".to_string(),
            aws: "aws".to_string(),
            clipboard: default_clipboard_command(),
            browser: default_browser_command(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            manifest_url: "https://raw.githubusercontent.com/kubernetes/dashboard/v2.7.0/aio/deploy/recommended.yaml".to_string(),
            proxy_url: "http://localhost:8001/api/v1/namespaces/kubernetes-dashboard/services/https:kubernetes-dashboard:/proxy/".to_string(),
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.trim().is_empty() {
            return Err(anyhow!("cluster_name must not be empty"));
        }
        if self.state_bucket.trim().is_empty() {
            return Err(anyhow!("state_bucket must not be empty"));
        }
        if self.defaults.region.trim().is_empty() {
            return Err(anyhow!("defaults.region must not be empty"));
        }
        if self.defaults.worker_instance_type.trim().is_empty()
            || self.defaults.master_instance_type.trim().is_empty()
        {
            return Err(anyhow!("defaults instance types must not be empty"));
        }
        for (name, program) in [
            ("tools.kops", &self.tools.kops),
            ("tools.kubectl", &self.tools.kubectl),
            ("tools.aws", &self.tools.aws),
        ] {
            if program.trim().is_empty() {
                return Err(anyhow!("{name} must not be empty"));
            }
        }
        for (name, argv) in [
            ("tools.clipboard", &self.tools.clipboard),
            ("tools.browser", &self.tools.browser),
        ] {
            if argv.first().is_none_or(|program| program.trim().is_empty()) {
                return Err(anyhow!("{name} must be a non-empty array"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ConsoleConfig::default()`.
pub fn load_config(path: &Path) -> Result<ConsoleConfig> {
    if !path.exists() {
        let cfg = ConsoleConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ConsoleConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
