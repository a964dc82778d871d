//! Ownership and reconciliation of the cluster definition.
//!
//! The [`Reconciler`] is the only holder of the [`ClusterDefinition`]. It
//! pulls remote state once per process (when the operator first confirms the
//! state bucket), then applies operator edits and sequences provisioning
//! calls. Operator interaction is passed in on each call rather than held.

use anyhow::{Context, Result, anyhow};
use tracing::{info, instrument, warn};

use crate::core::cluster::{ClusterDefinition, StorageHandle};
use crate::core::merge::{MergeReport, merge_records, parse_records};
use crate::core::review::{Field, apply_answers};
use crate::error::ConsoleError;
use crate::io::aws::Cloud;
use crate::io::config::ConsoleConfig;
use crate::io::console::Prompter;
use crate::io::kops::{ClusterLookup, CreateRequest, Provisioner};

/// Names the reconciler needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerSettings {
    pub cluster_name: String,
    pub state_bucket: String,
    pub defaults: ClusterDefinition,
}

impl From<&ConsoleConfig> for ReconcilerSettings {
    fn from(cfg: &ConsoleConfig) -> Self {
        Self {
            cluster_name: cfg.cluster_name.clone(),
            state_bucket: cfg.state_bucket.clone(),
            defaults: cfg.defaults.clone(),
        }
    }
}

pub struct Reconciler<P, C> {
    provisioner: P,
    cloud: C,
    settings: ReconcilerSettings,
    definition: ClusterDefinition,
    /// Set once a cluster was created here or found remotely.
    defined: bool,
    /// Confirmed state location. `Some` means the operator already agreed,
    /// and any merge from it has already run.
    storage: Option<StorageHandle>,
}

impl<P: Provisioner, C: Cloud> Reconciler<P, C> {
    /// Start from the configured defaults, so a region is always available
    /// for bucket creation.
    pub fn new(provisioner: P, cloud: C, settings: ReconcilerSettings) -> Self {
        let definition = settings.defaults.clone();
        Self {
            provisioner,
            cloud,
            settings,
            definition,
            defined: false,
            storage: None,
        }
    }

    pub fn definition(&self) -> &ClusterDefinition {
        &self.definition
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn cluster_name(&self) -> &str {
        &self.settings.cluster_name
    }

    pub fn storage(&self) -> Option<&StorageHandle> {
        self.storage.as_ref()
    }

    /// Resolve the state bucket, asking the operator at most once per
    /// process to confirm it.
    ///
    /// An existing bucket is reused and merged from; a missing one is
    /// created in the currently defined region.
    #[instrument(skip_all, fields(bucket = %self.settings.state_bucket))]
    pub fn ensure_storage<R: Prompter>(&mut self, prompter: &mut R) -> Result<StorageHandle> {
        if let Some(handle) = &self.storage {
            return Ok(handle.clone());
        }
        let bucket = self.settings.state_bucket.clone();
        let handle = StorageHandle::for_bucket(&bucket);
        let buckets = self.cloud.list_buckets().context("list buckets")?;

        if buckets.iter().any(|name| name == &bucket) {
            if !prompter.confirm(&format!("Found state bucket '{bucket}'. Use it?"))? {
                return Err(ConsoleError::StorageDeclined(bucket).into());
            }
            self.storage = Some(handle.clone());
            info!("reusing state bucket");
            self.announce_merge(&handle, prompter)?;
        } else {
            let region = self.definition.region.clone();
            if !prompter.confirm(&format!(
                "State bucket '{bucket}' does not exist. Create it in {region}?"
            ))? {
                return Err(ConsoleError::StorageDeclined(bucket).into());
            }
            self.cloud
                .create_bucket(&bucket, &region)
                .with_context(|| format!("create bucket {bucket}"))?;
            prompter.say(&format!("Created state bucket {handle}"))?;
            self.storage = Some(handle.clone());
        }
        Ok(handle)
    }

    fn announce_merge<R: Prompter>(&mut self, handle: &StorageHandle, prompter: &mut R) -> Result<()> {
        match self.merge_from_remote(handle)? {
            None => prompter.say("No existing cluster in the state bucket; using defaults."),
            Some(report) => {
                prompter.say("Loaded existing cluster definition:")?;
                for line in self.definition.summary_lines() {
                    prompter.say(&format!("  {line}"))?;
                }
                for warning in &report.warnings {
                    prompter.say(&format!("  warning: {warning}"))?;
                }
                Ok(())
            }
        }
    }

    /// Overwrite local fields from the remote cluster's instance groups.
    ///
    /// `None` means the location holds no cluster; the local definition is
    /// left untouched.
    #[instrument(skip_all, fields(state = %handle))]
    pub fn merge_from_remote(&mut self, handle: &StorageHandle) -> Result<Option<MergeReport>> {
        let name = self.settings.cluster_name.clone();
        if self.provisioner.get_cluster(handle, &name)? == ClusterLookup::Absent {
            info!("no remote cluster to merge");
            return Ok(None);
        }
        let raw = self.provisioner.get_instance_groups(handle, &name)?;
        let records = parse_records(&raw).context("parse instance group description")?;
        let report = merge_records(&mut self.definition, &records);
        for warning in &report.warnings {
            warn!(%warning, "skipped remote field");
        }
        info!(applied = ?report.applied, "merged remote cluster definition");
        self.defined = true;
        Ok(Some(report))
    }

    /// Reset to defaults in `region` and create the cluster configuration.
    ///
    /// A blank `region` keeps the configured default region.
    #[instrument(skip_all, fields(region))]
    pub fn define<R: Prompter>(&mut self, region: &str, prompter: &mut R) -> Result<()> {
        let handle = self.ensure_storage(prompter)?;
        let mut definition = self.settings.defaults.clone();
        let region = region.trim();
        if !region.is_empty() {
            definition.region = region.to_string();
        }
        self.create(&handle, &definition)?;
        self.definition = definition;
        self.defined = true;
        Ok(())
    }

    /// Edit the definition field by field, then replace the cluster.
    ///
    /// All answers are collected and parsed before anything changes. The
    /// remote cluster is always deleted and recreated, even when nothing was
    /// edited. The edits are kept only once the recreate succeeds.
    #[instrument(skip_all)]
    pub fn review<R: Prompter>(&mut self, prompter: &mut R) -> Result<()> {
        if !self.defined {
            return Err(ConsoleError::UndefinedCluster.into());
        }
        let handle = self.ensure_storage(prompter)?;

        let mut answers = Vec::with_capacity(Field::ALL.len());
        for field in Field::ALL {
            let prompt = format!("{} [{}]: ", field.label(), field.current(&self.definition));
            let answer = prompter
                .ask(&prompt)?
                .ok_or_else(|| anyhow!("input closed during review"))?;
            answers.push((field, answer));
        }
        let edited = apply_answers(&self.definition, &answers)?;

        let name = self.settings.cluster_name.clone();
        self.provisioner
            .delete_cluster(&handle, &name)
            .context("delete cluster before recreate")?;
        self.create(&handle, &edited).context("recreate cluster")?;
        self.definition = edited;
        Ok(())
    }

    pub fn launch<R: Prompter>(&mut self, prompter: &mut R) -> Result<()> {
        let handle = self.ensure_storage(prompter)?;
        self.provisioner
            .update_cluster(&handle, &self.settings.cluster_name)
    }

    pub fn validate<R: Prompter>(&mut self, prompter: &mut R) -> Result<()> {
        let handle = self.ensure_storage(prompter)?;
        self.provisioner
            .validate_cluster(&handle, &self.settings.cluster_name)
    }

    pub fn delete<R: Prompter>(&mut self, prompter: &mut R) -> Result<()> {
        let handle = self.ensure_storage(prompter)?;
        self.provisioner
            .delete_cluster(&handle, &self.settings.cluster_name)
    }

    fn create(&self, handle: &StorageHandle, definition: &ClusterDefinition) -> Result<()> {
        let region = &definition.region;
        let zones: Vec<String> = self
            .cloud
            .zones_for_region(region)
            .with_context(|| format!("list zones for {region}"))?
            .split(',')
            .map(str::trim)
            .filter(|zone| !zone.is_empty())
            .map(str::to_string)
            .collect();
        if zones.is_empty() {
            return Err(anyhow!("no availability zones found for region {region}"));
        }
        self.provisioner.create_cluster(&CreateRequest {
            name: self.settings.cluster_name.clone(),
            state: handle.clone(),
            zones,
            definition: definition.clone(),
        })
    }
}
