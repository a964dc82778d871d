//! Desired state of the single managed cluster.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque location of the provisioning tool's persisted state
/// (`s3://<bucket>`). Resolved once per process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageHandle(String);

impl StorageHandle {
    pub fn for_bucket(bucket: &str) -> Self {
        Self(format!("s3://{bucket}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Desired cluster shape. Every field always holds a usable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterDefinition {
    pub worker_node_count: u32,
    pub master_node_count: u32,
    /// Provider machine size, e.g. `t2.medium`.
    pub worker_instance_type: String,
    pub master_instance_type: String,
    pub region: String,
}

impl Default for ClusterDefinition {
    fn default() -> Self {
        Self {
            worker_node_count: 2,
            master_node_count: 1,
            worker_instance_type: "t2.medium".to_string(),
            master_instance_type: "t2.medium".to_string(),
            region: "eu-west-2".to_string(),
        }
    }
}

impl ClusterDefinition {
    /// Human-readable summary printed after define/review/merge.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Region: {}", self.region),
            format!(
                "Masters: {} x {}",
                self.master_node_count, self.master_instance_type
            ),
            format!(
                "Workers: {} x {}",
                self.worker_node_count, self.worker_instance_type
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_handle_is_s3_url() {
        assert_eq!(
            StorageHandle::for_bucket("state-store").as_str(),
            "s3://state-store"
        );
    }

    #[test]
    fn partial_toml_fills_remaining_fields_from_defaults() {
        let def: ClusterDefinition =
            toml::from_str("worker_node_count = 4\nregion = \"us-east-1\"\n").expect("parse");
        assert_eq!(def.worker_node_count, 4);
        assert_eq!(def.region, "us-east-1");
        assert_eq!(def.master_node_count, 1);
        assert_eq!(def.master_instance_type, "t2.medium");
    }
}
