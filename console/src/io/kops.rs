//! Provisioning-tool adapter.
//!
//! The [`Provisioner`] trait decouples the reconciler from the `kops` binary.
//! Tests use scripted provisioners that record calls without spawning
//! processes.

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::core::cluster::{ClusterDefinition, StorageHandle};
use crate::error::ConsoleError;
use crate::io::process::Tool;

/// Outcome of asking whether the state location holds a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLookup {
    Present,
    /// State location exists but holds no cluster. Not an error.
    Absent,
}

/// Inputs for `kops create cluster`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub name: String,
    pub state: StorageHandle,
    /// Availability zones of the definition's region.
    pub zones: Vec<String>,
    pub definition: ClusterDefinition,
}

/// Authorization mode passed on create. Deliberately permissive; operators
/// are expected to switch to RBAC out of band.
pub const AUTHORIZATION_MODE: &str = "AlwaysAllow";

pub trait Provisioner {
    fn get_cluster(&self, state: &StorageHandle, name: &str) -> Result<ClusterLookup>;
    /// Raw `-o json` output describing the cluster and its instance groups.
    fn get_instance_groups(&self, state: &StorageHandle, name: &str) -> Result<String>;
    fn create_cluster(&self, request: &CreateRequest) -> Result<()>;
    fn update_cluster(&self, state: &StorageHandle, name: &str) -> Result<()>;
    fn validate_cluster(&self, state: &StorageHandle, name: &str) -> Result<()>;
    fn delete_cluster(&self, state: &StorageHandle, name: &str) -> Result<()>;
}

impl<T: Provisioner + ?Sized> Provisioner for &T {
    fn get_cluster(&self, state: &StorageHandle, name: &str) -> Result<ClusterLookup> {
        (**self).get_cluster(state, name)
    }
    fn get_instance_groups(&self, state: &StorageHandle, name: &str) -> Result<String> {
        (**self).get_instance_groups(state, name)
    }
    fn create_cluster(&self, request: &CreateRequest) -> Result<()> {
        (**self).create_cluster(request)
    }
    fn update_cluster(&self, state: &StorageHandle, name: &str) -> Result<()> {
        (**self).update_cluster(state, name)
    }
    fn validate_cluster(&self, state: &StorageHandle, name: &str) -> Result<()> {
        (**self).validate_cluster(state, name)
    }
    fn delete_cluster(&self, state: &StorageHandle, name: &str) -> Result<()> {
        (**self).delete_cluster(state, name)
    }
}

/// Provisioner that spawns `kops`.
#[derive(Debug, Clone)]
pub struct Kops {
    tool: Tool,
}

impl Kops {
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }
}

impl Provisioner for Kops {
    #[instrument(skip_all, fields(state = %state, name))]
    fn get_cluster(&self, state: &StorageHandle, name: &str) -> Result<ClusterLookup> {
        let args = scoped(&["get", "cluster"], state, name);
        let args = as_strs(&args);
        let output = self.tool.capture(&args)?;
        match output.status.code() {
            Some(0) => Ok(ClusterLookup::Present),
            Some(1) => {
                debug!("state location holds no cluster");
                Ok(ClusterLookup::Absent)
            }
            code => Err(ConsoleError::ExternalToolFailure {
                tool: self.tool.program().to_string(),
                args: args.join(" "),
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into()),
        }
    }

    fn get_instance_groups(&self, state: &StorageHandle, name: &str) -> Result<String> {
        let args = instance_group_args(state, name);
        self.tool.capture_checked(&as_strs(&args))
    }

    #[instrument(skip_all, fields(name = %request.name, zones = %request.zones.join(",")))]
    fn create_cluster(&self, request: &CreateRequest) -> Result<()> {
        info!("creating cluster configuration");
        self.tool.attached(&as_strs(&create_args(request)))
    }

    fn update_cluster(&self, state: &StorageHandle, name: &str) -> Result<()> {
        let mut args = scoped(&["update", "cluster"], state, name);
        args.push("--yes".to_string());
        self.tool.attached(&as_strs(&args))
    }

    fn validate_cluster(&self, state: &StorageHandle, name: &str) -> Result<()> {
        let args = scoped(&["validate", "cluster"], state, name);
        self.tool.attached(&as_strs(&args))
    }

    #[instrument(skip_all, fields(state = %state, name))]
    fn delete_cluster(&self, state: &StorageHandle, name: &str) -> Result<()> {
        info!("deleting cluster");
        self.tool.attached(&as_strs(&delete_args(state, name)))
    }
}

fn scoped(subcommand: &[&str], state: &StorageHandle, name: &str) -> Vec<String> {
    let mut args: Vec<String> = subcommand.iter().map(|s| s.to_string()).collect();
    args.extend([
        "--name".to_string(),
        name.to_string(),
        "--state".to_string(),
        state.to_string(),
    ]);
    args
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

pub fn instance_group_args(state: &StorageHandle, name: &str) -> Vec<String> {
    vec![
        "get".to_string(),
        name.to_string(),
        "--state".to_string(),
        state.to_string(),
        "-o".to_string(),
        "json".to_string(),
    ]
}

pub fn create_args(request: &CreateRequest) -> Vec<String> {
    let def = &request.definition;
    let mut args = scoped(&["create", "cluster"], &request.state, &request.name);
    args.extend([
        "--zones".to_string(),
        request.zones.join(","),
        "--node-count".to_string(),
        def.worker_node_count.to_string(),
        "--node-size".to_string(),
        def.worker_instance_type.clone(),
        "--master-count".to_string(),
        def.master_node_count.to_string(),
        "--master-size".to_string(),
        def.master_instance_type.clone(),
        "--authorization".to_string(),
        AUTHORIZATION_MODE.to_string(),
    ]);
    args
}

pub fn delete_args(state: &StorageHandle, name: &str) -> Vec<String> {
    let mut args = vec![
        "delete".to_string(),
        "cluster".to_string(),
        "--unregister".to_string(),
    ];
    args.extend(scoped(&[], state, name));
    args.push("--yes".to_string());
    args
}
