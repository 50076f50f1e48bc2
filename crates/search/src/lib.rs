//! Argonaut filter engines.
//!
//! Two families live here:
//! - structural and tabular filters over a resource forest and its projected rows
//! - AND-narrowing filters over the flat application list ([`apps`])

#![forbid(unsafe_code)]

use std::time::Instant;

use argonaut_core::{TreeNode, TreeRow};
use tracing::debug;

pub mod apps;

pub use apps::{filter_applications, projects, AppFilterDebug, AppFilterOutcome};

/// Keep every subtree rooted at a node of `kind`, plus the ancestors needed to reach it.
///
/// Nodes below a match are kept unfiltered. Pass-through ancestors keep only the
/// branches that lead to a match. An empty `kind` is the identity.
pub fn apply_kind_filter(roots: &[TreeNode], kind: &str) -> Vec<TreeNode> {
    if kind.is_empty() {
        return roots.to_vec();
    }
    let t0 = Instant::now();
    let out: Vec<TreeNode> = roots.iter().filter_map(|r| filter_node(r, kind, false)).collect();
    metrics::histogram!("tree_kind_filter_ms", t0.elapsed().as_secs_f64() * 1000.0);
    debug!(kind, roots_in = roots.len(), roots_out = out.len(), "filter: kind applied");
    out
}

fn filter_node(node: &TreeNode, kind: &str, under_match: bool) -> Option<TreeNode> {
    let is_match = node.kind == kind;
    let keep_all = under_match || is_match;
    let children: Vec<TreeNode> =
        node.children.iter().filter_map(|c| filter_node(c, kind, keep_all)).collect();
    if !keep_all && children.is_empty() {
        return None;
    }
    Some(TreeNode { children, ..shallow(node) })
}

fn shallow(node: &TreeNode) -> TreeNode {
    TreeNode {
        kind: node.kind.clone(),
        name: node.name.clone(),
        namespace: node.namespace.clone(),
        health: node.health.clone(),
        sync: node.sync.clone(),
        children: Vec::new(),
        expanded: node.expanded,
        extra_parents: node.extra_parents.clone(),
    }
}

/// Case-insensitive AND over health and sync. Output rows lose tree decoration.
pub fn apply_status_filter(rows: &[TreeRow], health: Option<&str>, sync: Option<&str>) -> Vec<TreeRow> {
    let health = health.filter(|h| !h.is_empty());
    let sync = sync.filter(|s| !s.is_empty());
    let out: Vec<TreeRow> = rows
        .iter()
        .filter(|r| health.map_or(true, |h| r.health.eq_ignore_ascii_case(h)))
        .filter(|r| sync.map_or(true, |s| r.sync.eq_ignore_ascii_case(s)))
        .cloned()
        .map(TreeRow::into_flat)
        .collect();
    debug!(?health, ?sync, rows_in = rows.len(), rows_out = out.len(), "filter: status applied");
    out
}

/// Lower-cased substring search over `kind name namespace health sync`.
pub fn search_rows(rows: &[TreeRow], query: &str) -> Vec<TreeRow> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return rows.to_vec();
    }
    let t0 = Instant::now();
    let out: Vec<TreeRow> =
        rows.iter().filter(|r| r.search_string().contains(&q)).cloned().map(TreeRow::into_flat).collect();
    metrics::histogram!("tree_search_ms", t0.elapsed().as_secs_f64() * 1000.0);
    debug!(query = %q, hits = out.len(), "search: rows matched");
    out
}

/// Sorted, de-duplicated kinds of roots that own at least one child.
pub fn root_kinds_with_children(roots: &[TreeNode]) -> Vec<String> {
    let mut kinds: Vec<String> = roots.iter().filter(|r| r.has_children()).map(|r| r.kind.clone()).collect();
    kinds.sort();
    kinds.dedup();
    kinds
}

/// Shortcut letter offered for a kind in the kind filter menu.
pub fn kind_shortcut(kind: &str) -> Option<char> {
    KIND_SHORTCUTS.iter().find(|(k, _)| *k == kind).map(|(_, c)| *c)
}

/// Kind for a shortcut letter (case-insensitive).
pub fn kind_for_shortcut(c: char) -> Option<&'static str> {
    let c = c.to_ascii_lowercase();
    KIND_SHORTCUTS.iter().find(|(_, s)| *s == c).map(|(k, _)| *k)
}

pub const KIND_SHORTCUTS: [(&str, char); 12] = [
    ("Deployment", 'd'),
    ("Service", 's'),
    ("Ingress", 'i'),
    ("ConfigMap", 'c'),
    ("Secret", 'x'),
    ("Pod", 'p'),
    ("Job", 'j'),
    ("CronJob", 'r'),
    ("Namespace", 'n'),
    ("StatefulSet", 't'),
    ("DaemonSet", 'a'),
    ("ReplicaSet", 'e'),
];

#[cfg(test)]
mod tests {
    use super::*;
    use argonaut_core::{NodeKey, RowTone};

    fn node(kind: &str, name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            kind: kind.into(),
            name: name.into(),
            namespace: "default".into(),
            health: "Healthy".into(),
            sync: "Synced".into(),
            children,
            expanded: true,
            extra_parents: Default::default(),
        }
    }

    fn row(kind: &str, health: &str, sync: &str) -> TreeRow {
        TreeRow {
            key: NodeKey::new(kind, "default", kind.to_lowercase()),
            kind: kind.into(),
            name: kind.to_lowercase(),
            namespace: "default".into(),
            health: health.into(),
            sync: sync.into(),
            depth: 1,
            is_last: true,
            has_children: false,
            expanded: true,
            guides: vec![false],
            prefix: "└─  ".into(),
            tone: RowTone::for_statuses(health, sync),
        }
    }

    fn has_kind(n: &TreeNode, kind: &str) -> bool {
        n.kind == kind || n.children.iter().any(|c| has_kind(c, kind))
    }

    #[test]
    fn kind_filter_keeps_matching_subtree_whole() {
        let forest = vec![node("Deployment", "web", vec![node("ReplicaSet", "web-1", vec![node("Pod", "p", vec![])])])];
        let out = apply_kind_filter(&forest, "Deployment");
        assert_eq!(out, forest, "matching root keeps its full subtree");
    }

    #[test]
    fn kind_filter_prunes_non_matching_branches_of_passthrough_ancestors() {
        let forest = vec![
            node("Application", "app", vec![
                node("Service", "svc", vec![node("Endpoints", "ep", vec![])]),
                node("ConfigMap", "cm", vec![]),
            ]),
            node("Secret", "s", vec![]),
        ];
        let out = apply_kind_filter(&forest, "Service");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, "Application");
        assert_eq!(out[0].children.len(), 1, "ConfigMap branch is pruned");
        assert_eq!(out[0].children[0].children[0].kind, "Endpoints", "descendants of a match stay");
        for r in &out {
            assert!(has_kind(r, "Service"), "every root reaches the target kind");
        }
    }

    #[test]
    fn kind_filter_with_no_match_is_empty_and_empty_kind_is_identity() {
        let forest = vec![node("Deployment", "web", vec![])];
        assert!(apply_kind_filter(&forest, "Ingress").is_empty());
        assert_eq!(apply_kind_filter(&forest, ""), forest);
    }

    #[test]
    fn status_filter_is_case_insensitive_and() {
        let rows = vec![row("A", "Healthy", "Synced"), row("B", "Healthy", "OutOfSync"), row("C", "Degraded", "Synced")];
        let out = apply_status_filter(&rows, Some("healthy"), Some("SYNCED"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, "A");
        assert!(out[0].prefix.is_empty(), "status results are flat");
        assert_eq!(apply_status_filter(&rows, None, Some("")).len(), 3, "empty constraints keep everything");
    }

    #[test]
    fn search_matches_substring_any_case() {
        let rows = vec![row("Ingress", "Healthy", "Synced"), row("Service", "Healthy", "Synced")];
        let lower = search_rows(&rows, "ingress");
        let upper = search_rows(&rows, "INGRESS");
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].kind, "Ingress");
        assert_eq!(lower, upper);
        assert_eq!(search_rows(&rows, "outofsync").len(), 0);
    }

    #[test]
    fn root_kinds_with_children_sorted_unique() {
        let forest = vec![
            node("Service", "a", vec![node("Endpoints", "e", vec![])]),
            node("Deployment", "b", vec![node("ReplicaSet", "r", vec![])]),
            node("Service", "c", vec![node("Endpoints", "e2", vec![])]),
            node("ConfigMap", "d", vec![]),
        ];
        assert_eq!(root_kinds_with_children(&forest), vec!["Deployment", "Service"]);
    }

    #[test]
    fn kind_shortcuts_round_trip() {
        assert_eq!(kind_shortcut("CronJob"), Some('r'));
        assert_eq!(kind_for_shortcut('X'), Some("Secret"));
        assert_eq!(kind_for_shortcut('z'), None);
    }
}
