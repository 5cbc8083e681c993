//! End-to-end tests for the `wayfinder` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Diamond A-B-D / A-C-D with the southern way shorter, split into two
/// regions joined by the gateway B -> D, and a river along B-D
const WORLD: &str = r#"{
    "nodes": [
        {"id": 0, "x": 0.0, "y": 0.0, "region": 1},
        {"id": 1, "x": 10.0, "y": 0.0, "region": 1},
        {"id": 2, "x": 0.0, "y": -5.0, "region": 2},
        {"id": 3, "x": 10.0, "y": -5.0, "region": 2}
    ],
    "edges": [
        {"id": 0, "from": 0, "to": 1, "length": 10.0},
        {"id": 1, "from": 1, "to": 3, "length": 10.0},
        {"id": 2, "from": 0, "to": 2, "length": 5.0},
        {"id": 3, "from": 2, "to": 3, "length": 5.0}
    ],
    "gateways": [{"exit": 1, "entry": 3}],
    "barriers": [
        {"id": 0, "kind": "water", "coords": [[12.0, 1.0], [12.0, -6.0]], "edges": [1]}
    ],
    "buildings": [
        {"id": 0, "x": 5.0, "y": 2.0, "region": 1, "local_landmarkness": 0.8}
    ]
}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("world.json"), WORLD).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn world(&self) -> PathBuf {
        self.path("world.json")
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// The binary, isolated from the user's own config
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("wayfinder").unwrap();
        cmd.env("WAYFINDER_CONFIG", self.path("config.toml"))
            .env_remove("WAYFINDER_WORLD")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_route_shortest_distance() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["--world", arg(&fx.world()), "--format", "json"])
        .args(["route", "--origin", "0", "--destination", "3", "--exact"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["nodes"], serde_json::json!([0, 2, 3]));
    assert_eq!(report["length"], serde_json::json!(10.0));
    assert_eq!(report["reaches_destination"], serde_json::json!(true));
    assert_eq!(report["strategy_label"], serde_json::json!("RD"));
}

#[test]
fn test_route_region_profile() {
    let fx = Fixture::new();
    let profile = fx.write("walker.toml", "region_based = true\n");
    let output = fx
        .cmd()
        .args(["--world", arg(&fx.world()), "-f", "json"])
        .args(["route", "-o", "0", "-d", "3", "--exact", "--profile", arg(&profile)])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["sub_goals"], serde_json::json!([0, 1, 3]));
    assert_eq!(report["nodes"], serde_json::json!([0, 1, 3]));
}

#[test]
fn test_route_table_output() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--world", arg(&fx.world())])
        .args(["route", "-o", "0", "-d", "3", "--seed", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Route n0 -> n3"))
        .stdout(predicate::str::contains("Sub-goals: n0 -> n3"));
}

#[test]
fn test_route_through_via_nodes() {
    let fx = Fixture::new();
    let output = fx
        .cmd()
        .args(["--world", arg(&fx.world()), "-f", "json"])
        .args(["route", "-o", "0", "-d", "3", "--via", "1", "--exact"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["nodes"], serde_json::json!([0, 1, 3]));
}

#[test]
fn test_route_rejects_identical_endpoints() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--world", arg(&fx.world())])
        .args(["route", "-o", "2", "-d", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("same node"));
}

#[test]
fn test_route_without_world_fails() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["route", "-o", "0", "-d", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No world given"));
}

#[test]
fn test_configured_world_is_used() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["config", "set", "world", arg(&fx.world())])
        .assert()
        .success();
    fx.cmd()
        .args(["route", "-o", "0", "-d", "3", "--exact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Route n0 -> n3"));
}

#[test]
fn test_batch_counts_traffic() {
    let fx = Fixture::new();
    let trips = fx.write(
        "trips.json",
        r#"[
            {"origin": 0, "destination": 3},
            {"origin": 3, "destination": 0, "trip_index": 1},
            {"agent": {"agent_id": 2, "region_based": true}, "origin": 0, "destination": 3},
            {"origin": 1, "destination": 1}
        ]"#,
    );
    let counters = fx.path("counters.json");

    let output = fx
        .cmd()
        .args(["--world", arg(&fx.world()), "-f", "json"])
        .args(["batch", "--trips", arg(&trips), "--counters", arg(&counters)])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["trips"], serde_json::json!(4));
    assert_eq!(report["complete"], serde_json::json!(3));
    assert_eq!(report["failed"], serde_json::json!(1));
    assert!(!report["busiest"].as_array().unwrap().is_empty());

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&counters).unwrap()).unwrap();
    assert!(saved["counts"].is_object());
    // both road-distance trips walk the southern edge 2 -> 3
    assert_eq!(saved["counts"]["3"]["RD"], serde_json::json!(2));

    // a second batch adds to the saved counts
    fx.cmd()
        .args(["--world", arg(&fx.world())])
        .args(["batch", "--trips", arg(&trips), "--counters", arg(&counters)])
        .assert()
        .success();
    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&counters).unwrap()).unwrap();
    assert_eq!(saved["counts"]["3"]["RD"], serde_json::json!(4));
}

#[test]
fn test_inspect() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["--world", arg(&fx.world())])
        .args(["inspect", "--regions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes: 4"))
        .stdout(predicate::str::contains("Regions: 2 (1 gateways)"))
        .stdout(predicate::str::contains("1 water"))
        .stdout(predicate::str::contains("Buildings: 1 (1 landmarks)"));
}

#[test]
fn test_config_round_trip() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    fx.cmd().args(["config", "init"]).assert().success();
    fx.cmd().args(["config", "init"]).assert().failure();
    fx.cmd().args(["config", "init", "--force"]).assert().success();

    fx.cmd()
        .args(["config", "set", "planner.gateway_cone", "120"])
        .assert()
        .success();
    fx.cmd()
        .args(["config", "get", "planner.gateway_cone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("120"));

    fx.cmd()
        .args(["config", "unset", "planner.gateway_cone"])
        .assert()
        .success();
    fx.cmd()
        .args(["config", "get", "planner.gateway_cone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("140"));

    fx.cmd()
        .args(["config", "get", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
    fx.cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("planner.visibility_threshold = 300"));
}

#[test]
fn test_config_init_records_world() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["config", "init", "--world", arg(&fx.world())])
        .assert()
        .success();

    let output = fx.cmd().args(["-f", "json", "config", "list"]).output().unwrap();
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed["world"], serde_json::json!(arg(&fx.world())));
    assert_eq!(listed["planner"]["gateway_cone"], serde_json::json!(140.0));

    fx.cmd()
        .args(["route", "-o", "0", "-d", "3", "--exact"])
        .assert()
        .success();
}

#[test]
fn test_completions() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wayfinder"));
}
