//! Object storage and zone lookup through the `aws` CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::io::process::Tool;

pub trait Cloud {
    fn list_buckets(&self) -> Result<Vec<String>>;
    fn create_bucket(&self, bucket: &str, region: &str) -> Result<()>;
    /// Comma-joined availability-zone names for `region`.
    fn zones_for_region(&self, region: &str) -> Result<String>;
}

impl<T: Cloud + ?Sized> Cloud for &T {
    fn list_buckets(&self) -> Result<Vec<String>> {
        (**self).list_buckets()
    }
    fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        (**self).create_bucket(bucket, region)
    }
    fn zones_for_region(&self, region: &str) -> Result<String> {
        (**self).zones_for_region(region)
    }
}

#[derive(Debug, Clone)]
pub struct AwsCli {
    tool: Tool,
}

impl AwsCli {
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBuckets {
    #[serde(default)]
    buckets: Vec<BucketEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BucketEntry {
    name: String,
}

impl Cloud for AwsCli {
    fn list_buckets(&self) -> Result<Vec<String>> {
        let stdout = self
            .tool
            .capture_checked(&["s3api", "list-buckets", "--output", "json"])?;
        parse_bucket_names(&stdout)
    }

    #[instrument(skip_all, fields(bucket, region))]
    fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        info!("creating state bucket");
        let location = format!("LocationConstraint={region}");
        let mut args = vec!["s3api", "create-bucket", "--bucket", bucket, "--region", region];
        // us-east-1 rejects an explicit location constraint.
        if region != "us-east-1" {
            args.extend(["--create-bucket-configuration", location.as_str()]);
        }
        self.tool.capture_checked(&args)?;
        Ok(())
    }

    fn zones_for_region(&self, region: &str) -> Result<String> {
        let stdout = self.tool.capture_checked(&[
            "ec2",
            "describe-availability-zones",
            "--region",
            region,
            "--query",
            "AvailabilityZones[].ZoneName",
            "--output",
            "text",
        ])?;
        let zones = join_zones(&stdout);
        debug!(region, zones = %zones, "resolved zones");
        Ok(zones)
    }
}

fn parse_bucket_names(raw: &str) -> Result<Vec<String>> {
    let parsed: ListBuckets = serde_json::from_str(raw).context("parse list-buckets output")?;
    Ok(parsed.buckets.into_iter().map(|b| b.name).collect())
}

/// `--output text` separates values with tabs; the provisioner wants commas.
fn join_zones(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(",")
}
