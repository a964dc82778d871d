//! Menu-loop tests driving a full session against scripted collaborators.
//!
//! Each test feeds operator input through `ScriptedPrompter` and asserts on
//! the resulting cluster definition, what the operator saw, and the exact
//! sequence of provisioning calls.

use kops_console::core::cluster::{ClusterDefinition, StorageHandle};
use kops_console::io::config::DashboardConfig;
use kops_console::io::console::TerminalConsole;
use kops_console::reconciler::{Reconciler, ReconcilerSettings};
use kops_console::session::{INVALID_SELECTION, Session};
use kops_console::test_support::{
    RecordingDesktop, ScriptedCloud, ScriptedInspector, ScriptedPrompter, ScriptedProvisioner,
};

const FIXTURE: &str = include_str!("fixtures/instance_groups.json");

fn settings() -> ReconcilerSettings {
    ReconcilerSettings {
        cluster_name: "console.k8s.local".to_string(),
        state_bucket: "console-state".to_string(),
        defaults: ClusterDefinition::default(),
    }
}

type TestSession<'a> = Session<
    &'a ScriptedProvisioner,
    &'a ScriptedCloud,
    &'a ScriptedInspector,
    &'a RecordingDesktop,
>;

fn session<'a>(
    kops: &'a ScriptedProvisioner,
    cloud: &'a ScriptedCloud,
    inspector: &'a ScriptedInspector,
    desktop: &'a RecordingDesktop,
) -> TestSession<'a> {
    Session::new(
        Reconciler::new(kops, cloud, settings()),
        inspector,
        desktop,
        DashboardConfig::default(),
    )
}

fn merged_fixture_definition() -> ClusterDefinition {
    ClusterDefinition {
        worker_node_count: 5,
        master_node_count: 3,
        worker_instance_type: "t2.medium".to_string(),
        master_instance_type: "t2.xlarge".to_string(),
        region: "eu-west-2".to_string(),
    }
}

fn confirmations(prompter: &ScriptedPrompter) -> usize {
    prompter
        .prompts()
        .iter()
        .filter(|p| p.ends_with("[y/N]: "))
        .count()
}

#[test]
fn startup_merges_remote_instance_groups() {
    let kops = ScriptedProvisioner::present(FIXTURE);
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert_eq!(session.reconciler().definition(), &merged_fixture_definition());
    assert!(session.reconciler().is_defined());
    assert_eq!(kops.calls(), vec!["get-cluster", "get-instance-groups"]);
    assert!(
        prompter
            .output()
            .iter()
            .any(|line| line == "Loaded existing cluster definition:")
    );
}

#[test]
fn partial_remote_state_only_touches_mentioned_fields() {
    let only_nodes = r#"[{"kind":"InstanceGroup","metadata":{"name":"nodes"},
        "spec":{"role":"Node","minSize":4}}]"#;
    let kops = ScriptedProvisioner::present(only_nodes);
    let cloud = ScriptedCloud::with_bucket("console-state");
    let defaults = ClusterDefinition {
        region: "us-west-2".to_string(),
        master_instance_type: "m5.large".to_string(),
        ..ClusterDefinition::default()
    };
    let mut rec = Reconciler::new(
        &kops,
        &cloud,
        ReconcilerSettings {
            defaults: defaults.clone(),
            ..settings()
        },
    );

    let report = rec
        .merge_from_remote(&StorageHandle::for_bucket("console-state"))
        .expect("merge")
        .expect("cluster present");

    assert_eq!(
        rec.definition(),
        &ClusterDefinition {
            worker_node_count: 4,
            ..defaults
        }
    );
    assert_eq!(report.applied, vec!["worker_node_count"]);
    assert!(report.warnings.iter().any(|w| w.contains("machineType")));
}

#[test]
fn empty_remote_state_keeps_defaults() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let mut rec = Reconciler::new(&kops, &cloud, settings());

    let merged = rec
        .merge_from_remote(&StorageHandle::for_bucket("console-state"))
        .expect("absent is not an error");

    assert!(merged.is_none());
    assert_eq!(rec.definition(), &ClusterDefinition::default());
    assert!(!rec.is_defined());
    assert_eq!(kops.calls(), vec!["get-cluster"]);
}

#[test]
fn missing_bucket_is_created_with_default_region() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::without_buckets();
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["yes", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert_eq!(
        cloud.calls(),
        vec!["list-buckets", "create-bucket console-state eu-west-2"]
    );
    assert!(kops.calls().is_empty());
    assert_eq!(
        session.reconciler().storage().map(|h| h.as_str()),
        Some("s3://console-state")
    );
}

#[test]
fn invalid_input_is_reported_and_exit_stops_the_loop() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "", "a", "9", "12", "0", "4"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    let invalid = prompter
        .output()
        .iter()
        .filter(|line| *line == INVALID_SELECTION)
        .count();
    assert_eq!(invalid, 4);
    // "4" after exit is never read.
    assert_eq!(kops.calls(), vec!["get-cluster"]);
}

#[test]
fn end_of_input_leaves_the_loop() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");
    assert_eq!(prompter.prompts().len(), 2);
}

#[test]
fn review_before_define_is_refused_without_tool_calls() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "11", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert_eq!(kops.calls(), vec!["get-cluster"]);
    assert!(
        prompter
            .output()
            .iter()
            .any(|line| line.starts_with("Error: no cluster defined yet"))
    );
}

#[test]
fn define_then_review_replaces_the_cluster() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new([
        "y", "1", "us-east-1", "11", "6", "", "", "m5.large", "", "0",
    ]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    let expected = ClusterDefinition {
        worker_node_count: 6,
        master_instance_type: "m5.large".to_string(),
        region: "us-east-1".to_string(),
        ..ClusterDefinition::default()
    };
    assert_eq!(session.reconciler().definition(), &expected);
    assert_eq!(kops.calls(), vec!["get-cluster", "create", "delete", "create"]);
    let created = kops.created();
    assert_eq!(created[1].definition, expected);
    assert_eq!(created[1].zones, vec!["us-east-1a", "us-east-1b"]);
    assert!(
        prompter
            .prompts()
            .iter()
            .any(|p| p == "Number of worker nodes [2]: ")
    );
}

#[test]
fn review_with_blank_answers_still_deletes_then_recreates() {
    let kops = ScriptedProvisioner::present(FIXTURE);
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "11", "", "", "", "", "", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert_eq!(session.reconciler().definition(), &merged_fixture_definition());
    assert_eq!(
        kops.calls(),
        vec!["get-cluster", "get-instance-groups", "delete", "create"]
    );
    assert_eq!(kops.created()[0].definition, merged_fixture_definition());
}

#[test]
fn non_numeric_review_answer_changes_nothing() {
    let kops = ScriptedProvisioner::present(FIXTURE);
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter =
        ScriptedPrompter::new(["y", "11", "8", "c5.large", "many", "", "", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert_eq!(session.reconciler().definition(), &merged_fixture_definition());
    assert_eq!(kops.calls(), vec!["get-cluster", "get-instance-groups"]);
    assert!(
        prompter
            .output()
            .iter()
            .any(|line| line == "Error: Number of master nodes must be a whole number, got 'many'")
    );
}

#[test]
fn storage_confirmation_is_asked_once_per_process() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "2", "21", "4", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert_eq!(confirmations(&prompter), 1);
    assert_eq!(cloud.calls(), vec!["list-buckets"]);
    assert_eq!(
        kops.calls(),
        vec!["get-cluster", "update", "validate", "delete"]
    );
}

#[test]
fn tool_failure_is_reported_and_menu_continues() {
    let kops = ScriptedProvisioner::absent().failing("validate");
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "21", "4", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert!(
        prompter
            .output()
            .iter()
            .any(|line| line == "Error: kops validate failed (exit 1): scripted failure")
    );
    assert_eq!(kops.calls(), vec!["get-cluster", "validate", "delete"]);
}

#[test]
fn undecodable_terminal_input_is_an_invalid_selection() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::default();
    let desktop = RecordingDesktop::default();
    let mut console = TerminalConsole::new(&b"y\n\xff\n4\n0\n"[..], Vec::new());
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut console).expect("run");

    assert_eq!(kops.calls(), vec!["get-cluster", "delete"]);
    let shown = String::from_utf8(console.into_output()).expect("utf8");
    assert!(shown.contains(INVALID_SELECTION));
}

#[test]
fn view_and_dashboard_actions_use_inspector() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let inspector = ScriptedInspector::with_token("default-token-7x", "login-token");
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "3", "22", "23", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    let dashboard = DashboardConfig::default();
    assert_eq!(
        inspector.calls(),
        vec![
            "get nodes".to_string(),
            format!("apply {}", dashboard.manifest_url),
            "proxy".to_string(),
            "get serviceaccount default".to_string(),
            "get secret default-token-7x".to_string(),
        ]
    );
    assert_eq!(desktop.copied(), vec!["login-token"]);
    assert_eq!(desktop.opened(), vec![dashboard.proxy_url]);
}

#[test]
fn admin_credentials_are_shown_and_copied() {
    let kops = ScriptedProvisioner::absent();
    let cloud = ScriptedCloud::with_bucket("console-state");
    let mut inspector = ScriptedInspector::with_token("default-token-7x", "sa-token");
    inspector.config = ScriptedInspector::with_password("admin-pw").config;
    let desktop = RecordingDesktop::default();
    let mut prompter = ScriptedPrompter::new(["y", "31", "32", "0"]);
    let mut session = session(&kops, &cloud, &inspector, &desktop);

    session.run(&mut prompter).expect("run");

    assert_eq!(desktop.copied(), vec!["admin-pw", "sa-token"]);
    assert!(
        prompter
            .output()
            .iter()
            .any(|line| line == "The admin password is: admin-pw")
    );
    assert!(
        prompter
            .output()
            .iter()
            .any(|line| line == "The admin service account token is: sa-token")
    );
}
