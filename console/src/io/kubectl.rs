//! Inspection-tool adapter for `kubectl`.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::io::process::Tool;

pub trait Inspector {
    fn get_nodes(&self) -> Result<()>;
    fn config_view(&self) -> Result<Value>;
    fn service_account(&self, name: &str) -> Result<Value>;
    fn secret(&self, name: &str) -> Result<Value>;
    fn apply_manifest(&self, url: &str) -> Result<()>;
    /// Start `kubectl proxy` in the background. Nothing tracks it afterwards.
    fn start_proxy(&self) -> Result<()>;
}

impl<T: Inspector + ?Sized> Inspector for &T {
    fn get_nodes(&self) -> Result<()> {
        (**self).get_nodes()
    }
    fn config_view(&self) -> Result<Value> {
        (**self).config_view()
    }
    fn service_account(&self, name: &str) -> Result<Value> {
        (**self).service_account(name)
    }
    fn secret(&self, name: &str) -> Result<Value> {
        (**self).secret(name)
    }
    fn apply_manifest(&self, url: &str) -> Result<()> {
        (**self).apply_manifest(url)
    }
    fn start_proxy(&self) -> Result<()> {
        (**self).start_proxy()
    }
}

#[derive(Debug, Clone)]
pub struct Kubectl {
    tool: Tool,
}

impl Kubectl {
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }

    fn json(&self, args: &[&str]) -> Result<Value> {
        let stdout = self.tool.capture_checked(args)?;
        serde_json::from_str(&stdout)
            .with_context(|| format!("parse {} {} output", self.tool.program(), args.join(" ")))
    }
}

impl Inspector for Kubectl {
    fn get_nodes(&self) -> Result<()> {
        self.tool.attached(&["get", "nodes"])
    }

    fn config_view(&self) -> Result<Value> {
        self.json(&["config", "view", "-o", "json"])
    }

    fn service_account(&self, name: &str) -> Result<Value> {
        self.json(&["get", "serviceaccount", name, "-o", "json"])
    }

    fn secret(&self, name: &str) -> Result<Value> {
        self.json(&["get", "secret", name, "-o", "json"])
    }

    fn apply_manifest(&self, url: &str) -> Result<()> {
        info!(url, "applying manifest");
        self.tool.attached(&["apply", "-f", url])
    }

    fn start_proxy(&self) -> Result<()> {
        self.tool.spawn_detached(&["proxy"])
    }
}
