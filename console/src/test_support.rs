//! Scripted collaborators for driving the console without external tools.
//!
//! Each fake records the calls it receives so tests can assert ordering
//! (e.g. delete before create) and absence of calls.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use anyhow::{Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

use crate::core::cluster::StorageHandle;
use crate::error::ConsoleError;
use crate::io::aws::Cloud;
use crate::io::console::Prompter;
use crate::io::desktop::Desktop;
use crate::io::kops::{ClusterLookup, CreateRequest, Provisioner};
use crate::io::kubectl::Inspector;

/// `kops get <name> -o json` output with one node and one master group.
pub fn instance_groups_json(
    workers: u32,
    worker_type: &str,
    masters: u32,
    master_type: &str,
    master_subnet: &str,
) -> String {
    json!([
        { "kind": "Cluster", "metadata": { "name": "demo.k8s.local" }, "spec": {} },
        {
            "kind": "InstanceGroup",
            "metadata": { "name": "nodes" },
            "spec": { "role": "Node", "minSize": workers, "maxSize": workers, "machineType": worker_type }
        },
        {
            "kind": "InstanceGroup",
            "metadata": { "name": "master" },
            "spec": { "role": "Master", "minSize": masters, "maxSize": masters, "machineType": master_type, "subnets": [master_subnet] }
        }
    ])
    .to_string()
}

fn scripted_failure(tool: &str, args: &str) -> anyhow::Error {
    ConsoleError::ExternalToolFailure {
        tool: tool.to_string(),
        args: args.to_string(),
        code: Some(1),
        stderr: "scripted failure".to_string(),
    }
    .into()
}

/// Provisioner returning a fixed lookup/description.
///
/// Calls are recorded as `get-cluster`, `get-instance-groups`, `create`,
/// `update`, `validate` and `delete`.
#[derive(Debug, Default)]
pub struct ScriptedProvisioner {
    pub lookup: Option<ClusterLookup>,
    pub instance_groups: String,
    pub fail_on: Vec<&'static str>,
    calls: RefCell<Vec<String>>,
    created: RefCell<Vec<CreateRequest>>,
}

impl ScriptedProvisioner {
    /// State location exists but holds no cluster.
    pub fn absent() -> Self {
        Self {
            lookup: Some(ClusterLookup::Absent),
            ..Self::default()
        }
    }

    pub fn present(instance_groups: &str) -> Self {
        Self {
            lookup: Some(ClusterLookup::Present),
            instance_groups: instance_groups.to_string(),
            ..Self::default()
        }
    }

    /// Make the named call fail with a tool failure.
    pub fn failing(mut self, call: &'static str) -> Self {
        self.fail_on.push(call);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn created(&self) -> Vec<CreateRequest> {
        self.created.borrow().clone()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        self.calls.borrow_mut().push(call.to_string());
        if self.fail_on.contains(&call) {
            return Err(scripted_failure("kops", call));
        }
        Ok(())
    }
}

impl Provisioner for ScriptedProvisioner {
    fn get_cluster(&self, _state: &StorageHandle, _name: &str) -> Result<ClusterLookup> {
        self.record("get-cluster")?;
        self.lookup
            .ok_or_else(|| anyhow!("scripted provisioner has no lookup result"))
    }

    fn get_instance_groups(&self, _state: &StorageHandle, _name: &str) -> Result<String> {
        self.record("get-instance-groups")?;
        Ok(self.instance_groups.clone())
    }

    fn create_cluster(&self, request: &CreateRequest) -> Result<()> {
        self.record("create")?;
        self.created.borrow_mut().push(request.clone());
        Ok(())
    }

    fn update_cluster(&self, _state: &StorageHandle, _name: &str) -> Result<()> {
        self.record("update")
    }

    fn validate_cluster(&self, _state: &StorageHandle, _name: &str) -> Result<()> {
        self.record("validate")
    }

    fn delete_cluster(&self, _state: &StorageHandle, _name: &str) -> Result<()> {
        self.record("delete")
    }
}

/// Cloud with a fixed bucket list. Zones are `<region>a,<region>b`.
#[derive(Debug, Default)]
pub struct ScriptedCloud {
    buckets: RefCell<Vec<String>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedCloud {
    pub fn without_buckets() -> Self {
        Self::default()
    }

    pub fn with_bucket(bucket: &str) -> Self {
        Self {
            buckets: RefCell::new(vec![bucket.to_string()]),
            ..Self::default()
        }
    }

    /// Recorded as `list-buckets`, `create-bucket <bucket> <region>` and
    /// `zones <region>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Cloud for ScriptedCloud {
    fn list_buckets(&self) -> Result<Vec<String>> {
        self.calls.borrow_mut().push("list-buckets".to_string());
        Ok(self.buckets.borrow().clone())
    }

    fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("create-bucket {bucket} {region}"));
        self.buckets.borrow_mut().push(bucket.to_string());
        Ok(())
    }

    fn zones_for_region(&self, region: &str) -> Result<String> {
        self.calls.borrow_mut().push(format!("zones {region}"));
        Ok(format!("{region}a,{region}b"))
    }
}

/// Inspector answering from in-memory JSON documents.
#[derive(Debug, Default)]
pub struct ScriptedInspector {
    pub config: Value,
    pub account: Value,
    pub secrets: HashMap<String, Value>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedInspector {
    pub fn with_password(password: &str) -> Self {
        Self {
            config: json!({
                "current-context": "demo",
                "contexts": [{ "name": "demo", "context": { "user": "demo-basic-auth" } }],
                "users": [{ "name": "demo-basic-auth", "user": { "username": "admin", "password": password } }]
            }),
            account: json!({ "metadata": { "name": "default" } }),
            ..Self::default()
        }
    }

    pub fn with_token(secret_name: &str, token: &str) -> Self {
        let mut secrets = HashMap::new();
        secrets.insert(
            secret_name.to_string(),
            json!({ "data": { "token": STANDARD.encode(token) } }),
        );
        Self {
            account: json!({ "secrets": [{ "name": secret_name }] }),
            secrets,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl Inspector for ScriptedInspector {
    fn get_nodes(&self) -> Result<()> {
        self.record("get nodes".to_string());
        Ok(())
    }

    fn config_view(&self) -> Result<Value> {
        self.record("config view".to_string());
        Ok(self.config.clone())
    }

    fn service_account(&self, name: &str) -> Result<Value> {
        self.record(format!("get serviceaccount {name}"));
        Ok(self.account.clone())
    }

    fn secret(&self, name: &str) -> Result<Value> {
        self.record(format!("get secret {name}"));
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| scripted_failure("kubectl", &format!("get secret {name}")))
    }

    fn apply_manifest(&self, url: &str) -> Result<()> {
        self.record(format!("apply {url}"));
        Ok(())
    }

    fn start_proxy(&self) -> Result<()> {
        self.record("proxy".to_string());
        Ok(())
    }
}

/// Desktop that remembers what it was asked to copy and open.
#[derive(Debug, Default)]
pub struct RecordingDesktop {
    pub clipboard_fails: bool,
    copied: RefCell<Vec<String>>,
    opened: RefCell<Vec<String>>,
}

impl RecordingDesktop {
    pub fn broken_clipboard() -> Self {
        Self {
            clipboard_fails: true,
            ..Self::default()
        }
    }

    pub fn copied(&self) -> Vec<String> {
        self.copied.borrow().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl Desktop for RecordingDesktop {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        if self.clipboard_fails {
            return Err(anyhow!("no clipboard available"));
        }
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// Prompter answering from a queue; input ends when the queue is empty.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A prompter with no answers queued.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Every prompt shown, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Every line said, in order.
    pub fn output(&self) -> &[String] {
        &self.output
    }
}

impl Prompter for ScriptedPrompter {
    fn say(&mut self, line: &str) -> Result<()> {
        self.output.push(line.to_string());
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
