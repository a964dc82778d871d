//! Applying operator edits to a cluster definition.
//!
//! Edits are applied to a copy. The caller only sees a new definition when
//! every answer parsed, so a bad answer late in a review pass never leaves
//! earlier fields half-written.

use crate::core::cluster::ClusterDefinition;
use crate::error::ConsoleError;

/// Editable fields, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    WorkerNodeCount,
    WorkerInstanceType,
    MasterNodeCount,
    MasterInstanceType,
    Region,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::WorkerNodeCount,
        Field::WorkerInstanceType,
        Field::MasterNodeCount,
        Field::MasterInstanceType,
        Field::Region,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::WorkerNodeCount => "Number of worker nodes",
            Field::WorkerInstanceType => "Worker instance type",
            Field::MasterNodeCount => "Number of master nodes",
            Field::MasterInstanceType => "Master instance type",
            Field::Region => "Region",
        }
    }

    pub fn current(self, def: &ClusterDefinition) -> String {
        match self {
            Field::WorkerNodeCount => def.worker_node_count.to_string(),
            Field::WorkerInstanceType => def.worker_instance_type.clone(),
            Field::MasterNodeCount => def.master_node_count.to_string(),
            Field::MasterInstanceType => def.master_instance_type.clone(),
            Field::Region => def.region.clone(),
        }
    }
}

/// Build the edited definition from raw answers.
///
/// Blank answers keep the current value. Count fields must parse as
/// non-negative integers.
pub fn apply_answers(
    current: &ClusterDefinition,
    answers: &[(Field, String)],
) -> Result<ClusterDefinition, ConsoleError> {
    let mut edited = current.clone();
    for (field, raw) in answers {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        match field {
            Field::WorkerNodeCount => edited.worker_node_count = parse_count(*field, value)?,
            Field::MasterNodeCount => edited.master_node_count = parse_count(*field, value)?,
            Field::WorkerInstanceType => edited.worker_instance_type = value.to_string(),
            Field::MasterInstanceType => edited.master_instance_type = value.to_string(),
            Field::Region => edited.region = value.to_string(),
        }
    }
    Ok(edited)
}

fn parse_count(field: Field, value: &str) -> Result<u32, ConsoleError> {
    value
        .parse::<u32>()
        .map_err(|_| ConsoleError::NonNumericFieldInput {
            field: field.label(),
            input: value.to_string(),
        })
}
