//! Field-by-field merge of remote instance-group records into the local
//! cluster definition.
//!
//! Pure: takes already-fetched JSON and mutates only the fields a record
//! actually provides. A malformed field is reported and skipped; it never
//! aborts the rest of the merge.

use serde_json::Value;

use crate::core::cluster::ClusterDefinition;
use crate::core::region::{RegionGuess, region_from_subnet};

/// Role of an instance group as reported by the provisioning tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupRole {
    Node,
    Master,
}

impl GroupRole {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Node" => Some(Self::Node),
            // Newer kops releases report the control plane under this name.
            "Master" | "ControlPlane" => Some(Self::Master),
            _ => None,
        }
    }
}

/// What a merge changed and what it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Names of definition fields overwritten from remote data, in order.
    pub applied: Vec<&'static str>,
    /// Per-field problems for the operator to correct by hand.
    pub warnings: Vec<String>,
}

/// Split provisioning-tool output into individual records.
///
/// Accepts a single object, an array, a `{"items": [...]}` list, or several
/// JSON documents concatenated in one stream.
pub fn parse_records(raw: &str) -> Result<Vec<Value>, serde_json::Error> {
    let mut records = Vec::new();
    for doc in serde_json::Deserializer::from_str(raw).into_iter::<Value>() {
        flatten_into(doc?, &mut records);
    }
    Ok(records)
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        Value::Object(mut map) if map.get("items").is_some_and(Value::is_array) => {
            if let Some(items) = map.remove("items") {
                flatten_into(items, out);
            }
        }
        other => out.push(other),
    }
}

/// Apply every role-tagged record to `def` in order.
pub fn merge_records(def: &mut ClusterDefinition, records: &[Value]) -> MergeReport {
    let mut report = MergeReport::default();
    for record in records {
        let spec = record.get("spec").unwrap_or(record);
        let Some(role) = spec.get("role").and_then(Value::as_str) else {
            continue;
        };
        let name = record
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or(role);
        match GroupRole::parse(role) {
            Some(GroupRole::Node) => merge_node(def, spec, name, &mut report),
            Some(GroupRole::Master) => merge_master(def, spec, name, &mut report),
            None => tracing::debug!(role, name, "ignoring instance group role"),
        }
    }
    report
}

fn merge_node(def: &mut ClusterDefinition, spec: &Value, name: &str, report: &mut MergeReport) {
    if let Some(count) = read_count(spec, name, report) {
        def.worker_node_count = count;
        report.applied.push("worker_node_count");
    }
    if let Some(machine) = read_string(spec, "machineType", name, report) {
        def.worker_instance_type = machine;
        report.applied.push("worker_instance_type");
    }
}

fn merge_master(def: &mut ClusterDefinition, spec: &Value, name: &str, report: &mut MergeReport) {
    if let Some(count) = read_count(spec, name, report) {
        def.master_node_count = count;
        report.applied.push("master_node_count");
    }
    if let Some(machine) = read_string(spec, "machineType", name, report) {
        def.master_instance_type = machine;
        report.applied.push("master_instance_type");
    }
    let first_subnet = spec
        .get("subnets")
        .and_then(Value::as_array)
        .and_then(|subnets| subnets.first())
        .and_then(Value::as_str);
    match first_subnet.map(region_from_subnet) {
        Some(RegionGuess::Plausible(region)) => {
            if region != def.region {
                tracing::debug!(from = %def.region, to = %region, "region taken from master subnet");
            }
            def.region = region;
            report.applied.push("region");
        }
        Some(RegionGuess::Suspicious(region)) => report.warnings.push(format!(
            "{name}: region '{region}' derived from subnet does not look like a region; keeping '{}', correct it manually",
            def.region
        )),
        None => report
            .warnings
            .push(format!("{name}: no subnets listed; region not updated")),
    }
}

fn read_count(spec: &Value, name: &str, report: &mut MergeReport) -> Option<u32> {
    let Some(raw) = spec.get("minSize") else {
        report.warnings.push(format!("{name}: minSize missing"));
        return None;
    };
    match raw.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(count) => Some(count),
        None => {
            report
                .warnings
                .push(format!("{name}: minSize {raw} is not a non-negative integer"));
            None
        }
    }
}

fn read_string(spec: &Value, field: &str, name: &str, report: &mut MergeReport) -> Option<String> {
    match spec.get(field).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            report
                .warnings
                .push(format!("{name}: {field} missing or not a string"));
            None
        }
    }
}
