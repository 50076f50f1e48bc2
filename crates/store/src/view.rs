//! Per-screen tree view state and its reducer-style transitions.

#![forbid(unsafe_code)]

use argonaut_core::{
    EngineError, EngineResult, FilterDimension, FilterState, NodeKey, ResourceRecord, TreeNode, TreeRow,
};
use argonaut_search::{apply_kind_filter, apply_status_filter, root_kinds_with_children, search_rows};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::build::build_forest;
use crate::index::{self, collapse_fully, expand_fully, IdentityIndex};
use crate::project::{flatten, flatten_all};

/// How a rebuild treats expansion state of the previous forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebuildPolicy {
    /// Every node starts expanded.
    Fresh,
    /// Nodes whose key existed before keep their `expanded` flag; new nodes start expanded.
    PreserveExpansion,
}

/// How kind and status filters interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FilterMode {
    /// Kind filter first (structural), then status over the resulting rows.
    #[default]
    Compose,
    /// Only one applies; kind wins when both are set.
    Exclusive,
}

#[derive(Debug, Clone, Default)]
pub struct TreeViewState {
    records: Vec<ResourceRecord>,
    roots: Vec<TreeNode>,
    index: IdentityIndex,
    all_expanded: bool,
    filters: FilterState,
    search: String,
    mode: FilterMode,
    generation: u64,
    notice: Option<EngineError>,
}

impl TreeViewState {
    pub fn new(mode: FilterMode) -> Self {
        Self { mode, all_expanded: true, ..Default::default() }
    }

    pub fn from_records(records: Vec<ResourceRecord>) -> Self {
        let mut s = Self::new(FilterMode::default());
        s.rebuild(records, RebuildPolicy::Fresh);
        s
    }

    /// Replace the source data, rebuild the forest and the identity index.
    pub fn rebuild(&mut self, records: Vec<ResourceRecord>, policy: RebuildPolicy) {
        let mut roots = build_forest(&records);
        if policy == RebuildPolicy::PreserveExpansion && !self.roots.is_empty() {
            let mut previous: FxHashMap<NodeKey, bool> = FxHashMap::default();
            collect_expanded(&self.roots, &mut previous);
            apply_expanded(&mut roots, &previous);
        } else {
            self.all_expanded = true;
        }
        self.index = IdentityIndex::build(&roots);
        self.roots = roots;
        self.records = records;
        self.generation = self.generation.wrapping_add(1);
        info!(
            generation = self.generation,
            records = self.records.len(),
            roots = self.roots.len(),
            ?policy,
            "tree: rebuilt"
        );
    }

    pub fn roots(&self) -> &[TreeNode] { &self.roots }
    pub fn records(&self) -> &[ResourceRecord] { &self.records }
    pub fn index(&self) -> &IdentityIndex { &self.index }
    pub fn generation(&self) -> u64 { self.generation }
    pub fn all_expanded(&self) -> bool { self.all_expanded }
    pub fn mode(&self) -> FilterMode { self.mode }
    pub fn set_mode(&mut self, mode: FilterMode) { self.mode = mode; }

    pub fn expand_all(&mut self) {
        self.roots.iter_mut().for_each(expand_fully);
        self.all_expanded = true;
    }

    pub fn collapse_all(&mut self) {
        self.roots.iter_mut().for_each(collapse_fully);
        self.all_expanded = false;
    }

    pub fn toggle_expansion_all(&mut self) {
        if self.all_expanded { self.collapse_all() } else { self.expand_all() }
    }

    /// Toggle one node by identity. Stale keys are reported, not fatal.
    pub fn toggle_node(&mut self, key: &NodeKey) -> EngineResult<bool> {
        let res = index::toggle_node(&mut self.roots, &self.index, key);
        if let Err(e) = &res {
            debug!(error = %e, "tree: toggle ignored");
        }
        res
    }

    pub fn filters(&self) -> &FilterState { &self.filters }

    pub fn set_filter(&mut self, dim: FilterDimension, value: impl Into<String>) {
        self.filters.set(dim, value);
    }

    pub fn toggle_filter(&mut self, dim: FilterDimension, value: &str) {
        self.filters.toggle(dim, value);
    }

    pub fn clear_filters(&mut self) { self.filters.clear(); }

    pub fn active_filters_description(&self) -> String { self.filters.description() }

    pub fn search(&self) -> &str { &self.search }

    /// Commit a search query. Clearing an active search rebuilds the forest fresh,
    /// so the tree comes back fully expanded.
    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into().trim().to_string();
        let cleared = text.is_empty() && !self.search.is_empty();
        self.search = text;
        if cleared {
            let records = std::mem::take(&mut self.records);
            self.rebuild(records, RebuildPolicy::Fresh);
        }
    }

    /// Condition reported by the last [`rows`](Self::rows) call, if any.
    pub fn notice(&self) -> Option<&EngineError> { self.notice.as_ref() }

    pub fn root_kinds_with_children(&self) -> Vec<String> { root_kinds_with_children(&self.roots) }

    /// Project the current state into display rows.
    ///
    /// A non-empty search ignores filters and matches over a freshly built, fully
    /// expanded forest. A filter that empties the view falls back to the unfiltered
    /// tree and records an `EmptyResult` notice.
    pub fn rows(&mut self) -> Vec<TreeRow> {
        self.notice = None;
        if !self.search.is_empty() {
            let fresh = build_forest(&self.records);
            return search_rows(&flatten_all(&fresh), &self.search);
        }

        let kind = self.filters.get(FilterDimension::Kind).map(str::to_string);
        let health = self.filters.get(FilterDimension::Health).map(str::to_string);
        let sync = self.filters.get(FilterDimension::Sync).map(str::to_string);
        let status_active = health.is_some() || sync.is_some();

        let apply_status = match self.mode {
            FilterMode::Compose => status_active,
            FilterMode::Exclusive => status_active && kind.is_none(),
        };

        let mut kind_miss: Option<String> = None;
        let base: Vec<TreeNode> = match kind.as_deref() {
            Some(k) => {
                let filtered = apply_kind_filter(&self.roots, k);
                if filtered.is_empty() {
                    kind_miss = Some(k.to_string());
                    self.roots.clone()
                } else {
                    filtered
                }
            }
            None => self.roots.clone(),
        };

        if !apply_status {
            if let Some(k) = kind_miss {
                self.notice = Some(EngineError::EmptyResult { dimension: "kind".into(), value: k });
            }
            return flatten(&base);
        }
        // A kind miss still honours the status filter; only a status miss drops to the full tree.
        let rows = apply_status_filter(&flatten_all(&base), health.as_deref(), sync.as_deref());
        let mut missed: Vec<(&str, String)> = Vec::new();
        if let Some(k) = kind_miss {
            missed.push(("kind", k));
        }
        if rows.is_empty() {
            missed.extend(health.clone().map(|h| ("health", h)));
            missed.extend(sync.clone().map(|s| ("sync", s)));
        }
        if !missed.is_empty() {
            let dimension = missed.iter().map(|(d, _)| *d).collect::<Vec<_>>().join(",");
            let value = missed.iter().map(|(_, v)| v.as_str()).collect::<Vec<_>>().join(",");
            self.notice = Some(EngineError::EmptyResult { dimension, value });
        }
        if rows.is_empty() {
            return flatten(&self.roots);
        }
        rows
    }
}

fn collect_expanded(nodes: &[TreeNode], out: &mut FxHashMap<NodeKey, bool>) {
    for n in nodes {
        out.entry(n.key()).or_insert(n.expanded);
        collect_expanded(&n.children, out);
    }
}

fn apply_expanded(nodes: &mut [TreeNode], prev: &FxHashMap<NodeKey, bool>) {
    for n in nodes.iter_mut() {
        if let Some(e) = prev.get(&n.key()) {
            n.expanded = *e;
        }
        apply_expanded(&mut n.children, prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(uid: &str, kind: &str, name: &str, health: &str, sync: &str, parents: &[&str]) -> ResourceRecord {
        ResourceRecord {
            uid: uid.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: "default".into(),
            health: Some(health.into()),
            sync: Some(sync.into()),
            parent_refs: parents.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn records() -> Vec<ResourceRecord> {
        vec![
            rec("1", "Deployment", "web", "Healthy", "Synced", &[]),
            rec("2", "ReplicaSet", "web-1", "Healthy", "Synced", &["1"]),
            rec("3", "Pod", "web-1-a", "Degraded", "Synced", &["2"]),
            rec("4", "Service", "web", "Healthy", "OutOfSync", &[]),
            rec("5", "Endpoints", "web", "Healthy", "Synced", &["4"]),
        ]
    }

    fn kinds(rows: &[TreeRow]) -> Vec<&str> {
        rows.iter().map(|r| r.kind.as_str()).collect()
    }

    #[test]
    fn preserve_expansion_across_refetch_with_new_uids() {
        let mut st = TreeViewState::from_records(records());
        st.toggle_node(&NodeKey::new("Deployment", "default", "web")).expect("toggle");
        let mut again = records();
        for r in again.iter_mut() {
            r.uid = format!("x{}", r.uid);
            r.parent_refs = r.parent_refs.iter().map(|p| format!("x{}", p)).collect();
        }
        again.push(rec("x6", "Pod", "web-1-b", "Healthy", "Synced", &["x2"]));
        st.rebuild(again, RebuildPolicy::PreserveExpansion);
        assert!(!st.roots()[0].expanded, "collapsed state survives");
        assert_eq!(kinds(&st.rows()), vec!["Deployment", "Service", "Endpoints"]);
        assert!(st.index().contains(&NodeKey::new("Pod", "default", "web-1-b")), "index is rebuilt");
    }

    #[test]
    fn fresh_rebuild_expands_everything() {
        let mut st = TreeViewState::from_records(records());
        st.collapse_all();
        st.rebuild(records(), RebuildPolicy::Fresh);
        assert_eq!(st.rows().len(), 5);
        assert!(st.all_expanded());
    }

    #[test]
    fn toggle_expansion_all_flips_global_flag() {
        let mut st = TreeViewState::from_records(records());
        st.toggle_expansion_all();
        assert!(!st.all_expanded());
        assert_eq!(st.rows().len(), 2);
        st.toggle_expansion_all();
        assert_eq!(st.rows().len(), 5);
    }

    #[test]
    fn single_toggle_leaves_global_flag() {
        let mut st = TreeViewState::from_records(records());
        st.toggle_node(&NodeKey::new("Service", "default", "web")).expect("toggle");
        assert!(st.all_expanded());
        assert_eq!(st.rows().len(), 4);
    }

    #[test]
    fn compose_mode_applies_kind_then_status() {
        let mut st = TreeViewState::from_records(records());
        st.set_filter(FilterDimension::Kind, "Deployment");
        st.set_filter(FilterDimension::Health, "degraded");
        let rows = st.rows();
        assert_eq!(kinds(&rows), vec!["Pod"]);
        assert!(st.notice().is_none());
    }

    #[test]
    fn exclusive_mode_lets_kind_win() {
        let mut st = TreeViewState::from_records(records());
        st.set_mode(FilterMode::Exclusive);
        st.set_filter(FilterDimension::Kind, "Deployment");
        st.set_filter(FilterDimension::Health, "degraded");
        assert_eq!(kinds(&st.rows()), vec!["Deployment", "ReplicaSet", "Pod"]);
        st.set_filter(FilterDimension::Kind, "");
        assert_eq!(kinds(&st.rows()), vec!["Pod"]);
    }

    #[test]
    fn empty_kind_result_falls_back_with_notice() {
        let mut st = TreeViewState::from_records(records());
        st.set_filter(FilterDimension::Kind, "Ingress");
        let rows = st.rows();
        assert_eq!(rows.len(), 5, "unfiltered view is shown");
        assert_eq!(
            st.notice(),
            Some(&EngineError::EmptyResult { dimension: "kind".into(), value: "Ingress".into() })
        );
        st.clear_filters();
        let _ = st.rows();
        assert!(st.notice().is_none());
    }

    #[test]
    fn status_only_filter_matches_collapsed_nodes_too() {
        let mut st = TreeViewState::from_records(records());
        st.collapse_all();
        st.set_filter(FilterDimension::Sync, "OutOfSync");
        assert_eq!(kinds(&st.rows()), vec!["Service"]);
    }

    #[test]
    fn search_ignores_filters_and_collapse() {
        let mut st = TreeViewState::from_records(records());
        st.collapse_all();
        st.set_filter(FilterDimension::Kind, "Service");
        st.set_search("POD");
        let rows = st.rows();
        assert_eq!(kinds(&rows), vec!["Pod"]);
        assert!(rows[0].prefix.is_empty());
        st.set_search("  ");
        assert!(st.all_expanded());
        assert_eq!(kinds(&st.rows()), vec!["Service", "Endpoints"], "cleared search rebuilds fully expanded");
    }

    #[test]
    fn clearing_search_rebuilds_fresh() {
        let mut st = TreeViewState::from_records(vec![
            rec("1", "Deployment", "web", "Healthy", "Synced", &[]),
            rec("2", "ReplicaSet", "web-1", "Healthy", "Synced", &["1"]),
            rec("3", "Pod", "web-1-a", "Healthy", "Synced", &["2"]),
        ]);
        st.collapse_all();
        assert_eq!(st.rows().len(), 1);
        st.set_search("pod");
        assert_eq!(st.rows().len(), 1);
        let generation = st.generation();
        st.set_search("");
        assert_eq!(st.rows().len(), 3);
        assert_eq!(st.generation(), generation + 1);
        assert_eq!(st.records().len(), 3, "source records survive the rebuild");
    }

    #[test]
    fn empty_search_without_prior_query_keeps_expansion() {
        let mut st = TreeViewState::from_records(records());
        st.collapse_all();
        st.set_search("");
        assert_eq!(st.rows().len(), 2);
    }

    #[test]
    fn kind_miss_still_applies_status_filter() {
        let mut st = TreeViewState::from_records(records());
        st.set_filter(FilterDimension::Kind, "Ingress");
        st.set_filter(FilterDimension::Health, "Degraded");
        assert_eq!(kinds(&st.rows()), vec!["Pod"]);
        assert_eq!(
            st.notice(),
            Some(&EngineError::EmptyResult { dimension: "kind".into(), value: "Ingress".into() })
        );
        st.set_filter(FilterDimension::Health, "Suspended");
        assert_eq!(st.rows().len(), 5, "nothing matches at all: unfiltered tree");
        assert_eq!(
            st.notice(),
            Some(&EngineError::EmptyResult { dimension: "kind,health".into(), value: "Ingress,Suspended".into() })
        );
    }

    #[test]
    fn description_reports_active_dimensions() {
        let mut st = TreeViewState::new(FilterMode::Compose);
        assert_eq!(st.active_filters_description(), "None");
        st.set_filter(FilterDimension::Kind, "Service");
        st.set_filter(FilterDimension::Sync, "Synced");
        assert_eq!(st.active_filters_description(), "kind=Service, sync=Synced");
    }
}
