use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

struct TestFamily {
    root: PathBuf,
}

impl TestFamily {
    fn new(config: &str) -> Self {
        let root = unique_temp_dir("family-tree");
        fs::create_dir_all(root.join(".kinfolk")).expect("create .kinfolk");
        fs::create_dir_all(root.join("data")).expect("create data dir");
        fs::write(root.join(".kinfolk").join("config.toml"), config).expect("write config");

        fs::write(
            root.join("data").join("members.json"),
            r#"[
  {"id": "dad", "firstName": "Tom", "lastName": "Berg", "gender": "male", "spouseId": "mum"},
  {"id": "mum", "firstName": "Eva", "lastName": "Berg", "gender": "female", "spouseId": "dad"},
  {"id": "liv", "firstName": "Liv", "lastName": "Berg", "gender": "female", "fatherId": "dad", "motherid": "mum"},
  {"id": "ola", "firstName": "Ola", "lastName": "Berg", "gender": "male", "fatherId": "dad", "motherId": "mum", "spouseId": "ghost"}
]"#,
        )
        .expect("write members.json");
        fs::write(
            root.join("data").join("zz-extra.yaml"),
            "members:\n  - id: kai\n    firstName: Kai\n    lastName: Holm\n",
        )
        .expect("write zz-extra.yaml");

        Self { root }
    }

    fn run_kinfolk(&self, args: &[&str]) -> std::process::Output {
        Command::new(kinfolk_bin())
            .current_dir(&self.root)
            .env_remove("KINFOLK_CONFIG")
            .env_remove("KINFOLK_DATA")
            .args(args)
            .output()
            .expect("run kinfolk")
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.run_kinfolk(args);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        assert!(
            output.status.success(),
            "kinfolk {} failed\nstdout:\n{stdout}\nstderr:\n{stderr}",
            args.join(" ")
        );
        serde_json::from_slice(&output.stdout).expect("parse json output")
    }
}

impl Drop for TestFamily {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

const CONFIG: &str = r#"[data]
sources = ["data/*"]
"#;

fn kinfolk_bin() -> PathBuf {
    PathBuf::from(
        std::env::var("CARGO_BIN_EXE_kinfolk")
            .expect("CARGO_BIN_EXE_kinfolk is not set for integration test"),
    )
}

fn unique_temp_dir(prefix: &str) -> PathBuf {
    static TEMP_DIR_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

    let pid = std::process::id();
    for _ in 0..32 {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos();
        let seq = TEMP_DIR_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let candidate = std::env::temp_dir().join(format!("kinfolk-{prefix}-{pid}-{nanos}-{seq}"));
        match fs::create_dir(&candidate) {
            Ok(()) => return candidate,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => panic!("failed to create temp dir {}: {}", candidate.display(), err),
        }
    }

    panic!("failed to create unique temp dir for {prefix}");
}

fn node_ids(graph: &serde_json::Value) -> Vec<String> {
    graph["nodes"]
        .as_array()
        .expect("nodes array")
        .iter()
        .map(|node| node["id"].as_str().unwrap_or("").to_string())
        .collect()
}

#[test]
fn tree_json_contains_every_member_once_without_dangling_edges() {
    let family = TestFamily::new(CONFIG);
    let graph = family.run_json(&["tree"]);

    let ids = node_ids(&graph);
    let unique: HashSet<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(unique.len(), 5);
    for id in ["dad", "mum", "liv", "ola", "kai"] {
        assert!(unique.contains(id), "missing node {id}");
    }

    let edges = graph["edges"].as_array().expect("edges array");
    for edge in edges {
        assert!(unique.contains(edge["source"].as_str().unwrap_or("")));
        assert!(unique.contains(edge["target"].as_str().unwrap_or("")));
    }
    let spouse_edges: Vec<_> = edges
        .iter()
        .filter(|edge| edge["styleClass"] == "spouse")
        .collect();
    assert_eq!(spouse_edges.len(), 1);
    assert_eq!(spouse_edges[0]["animated"], true);
    assert_eq!(
        edges
            .iter()
            .filter(|edge| edge["styleClass"] == "parent")
            .count(),
        4
    );

    let kai = graph["nodes"]
        .as_array()
        .and_then(|nodes| nodes.iter().find(|node| node["id"] == "kai"))
        .expect("kai node");
    assert_eq!(kai["position"]["y"], 0.0);
    assert_eq!(kai["position"]["x"], 440.0);
    assert_eq!(kai["styleClass"], "default");
}

#[test]
fn tree_uses_configured_label_template_and_flag_override() {
    let family = TestFamily::new(
        r#"[data]
sources = ["data/*"]

[labels]
template = "{{ first_name }} ({{ id }})"
"#,
    );
    let graph = family.run_json(&["tree"]);
    let labels: Vec<&str> = graph["nodes"]
        .as_array()
        .expect("nodes array")
        .iter()
        .map(|node| node["label"].as_str().unwrap_or(""))
        .collect();
    assert!(labels.contains(&"Tom (dad)"));

    let graph = family.run_json(&["tree", "--label-template", "{{ last_name }}"]);
    assert_eq!(graph["nodes"][0]["label"], "Berg");
}

#[test]
fn tree_dot_and_text_formats_render() {
    let family = TestFamily::new(CONFIG);

    let output = family.run_kinfolk(&["tree", "--format", "dot"]);
    assert!(output.status.success());
    let dot = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(dot.starts_with("digraph kinfolk {"));
    assert!(dot.contains(r#""dad" -> "liv" [class="parent"];"#));

    let output = family.run_kinfolk(&["tree", "--format", "text"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(text.starts_with("row 0: Tom Berg [dad]"));

    let output = family.run_kinfolk(&["tree", "--format", "svg"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(stderr.contains("unknown graph format"));
}

#[test]
fn data_flag_replaces_configured_sources() {
    let family = TestFamily::new(CONFIG);
    let graph = family.run_json(&["--data", "data/members.json", "tree"]);
    assert_eq!(node_ids(&graph).len(), 4);
}

#[test]
fn members_lists_and_filters_by_regex() {
    let family = TestFamily::new(CONFIG);
    let rows = family.run_json(&["members", "--json", "--match", "^(Liv|Kai)"]);
    let ids: Vec<&str> = rows
        .as_array()
        .expect("rows array")
        .iter()
        .map(|row| row["id"].as_str().unwrap_or(""))
        .collect();
    assert_eq!(ids, vec!["liv", "kai"]);
}

#[test]
fn missing_data_reports_error() {
    let family = TestFamily::new("[data]\nsources = [\"nope/*.json\"]\n");
    let output = family.run_kinfolk(&["tree"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(stderr.contains("matched no files"), "stderr:\n{stderr}");
}
