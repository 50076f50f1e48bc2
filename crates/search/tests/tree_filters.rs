#![forbid(unsafe_code)]

use argonaut_core::{ResourceRecord, TreeNode};
use argonaut_search::{apply_kind_filter, apply_status_filter, search_rows};
use argonaut_store::{build_forest, flatten, flatten_all};

fn rec(uid: usize, kind: &str, parent: Option<usize>, health: &str, sync: &str) -> ResourceRecord {
    ResourceRecord {
        uid: uid.to_string(),
        kind: kind.into(),
        name: format!("{}-{}", kind.to_lowercase(), uid),
        namespace: "default".into(),
        health: Some(health.into()),
        sync: Some(sync.into()),
        parent_refs: parent.map(|p| p.to_string()).into_iter().collect(),
        ..Default::default()
    }
}

/// Deterministic mixed forest: a few apps with deployments, services and config.
fn world() -> Vec<ResourceRecord> {
    let kinds = ["Deployment", "ReplicaSet", "Pod", "Service", "Endpoints", "ConfigMap"];
    let healths = ["Healthy", "Progressing", "Degraded"];
    let syncs = ["Synced", "OutOfSync"];
    (0..60)
        .map(|i| {
            let parent = if i % 5 == 0 { None } else { Some(i - 1 - (i % 3).min(i - 1)) };
            rec(i, kinds[i % kinds.len()], parent, healths[i % 3], syncs[(i / 2) % 2])
        })
        .collect()
}

fn contains_kind(n: &TreeNode, kind: &str) -> bool {
    n.kind == kind || n.children.iter().any(|c| contains_kind(c, kind))
}

#[test]
fn kind_filter_roots_always_reach_target() {
    let forest = build_forest(&world());
    for kind in ["Deployment", "Pod", "Service", "ConfigMap", "Missing"] {
        let out = apply_kind_filter(&forest, kind);
        for root in &out {
            assert!(contains_kind(root, kind), "root {} must reach {}", root.name, kind);
        }
        if kind == "Missing" {
            assert!(out.is_empty());
        }
    }
}

#[test]
fn status_filter_matches_exactly_the_and_of_predicates() {
    let forest = build_forest(&world());
    let rows = flatten_all(&forest);
    let out = apply_status_filter(&rows, Some("HEALTHY"), Some("synced"));
    let expected = rows.iter().filter(|r| r.health == "Healthy" && r.sync == "Synced").count();
    assert_eq!(out.len(), expected);
    assert!(out.iter().all(|r| r.health == "Healthy" && r.sync == "Synced"));
}

#[test]
fn search_is_a_subset_of_all_rows() {
    let forest = build_forest(&world());
    let rows = flatten_all(&forest);
    let hits = search_rows(&rows, "endpoints");
    assert_eq!(hits.len(), rows.iter().filter(|r| r.kind == "Endpoints").count());
    assert_eq!(search_rows(&rows, "ENDPOINTS"), hits);
}

#[test]
fn chain_of_three_flattens_in_order() {
    let forest = build_forest(&[
        rec(1, "Deployment", None, "Healthy", "Synced"),
        rec(2, "ReplicaSet", Some(1), "Healthy", "Synced"),
        rec(3, "Pod", Some(2), "Healthy", "Synced"),
    ]);
    let rows = flatten(&forest);
    assert_eq!(rows.iter().map(|r| r.kind.as_str()).collect::<Vec<_>>(), ["Deployment", "ReplicaSet", "Pod"]);
    assert_eq!(rows.iter().map(|r| r.depth).collect::<Vec<_>>(), [0, 1, 2]);
    assert!(rows.iter().all(|r| r.is_last));
}
