//! Argonaut core types: server records, tree nodes, applications and filter state.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub mod columns;
pub mod filter;
pub mod status;

pub use filter::{FilterDimension, FilterState};
pub use status::{RowTone, DEFAULT_HEALTH, DEFAULT_SYNC, HEALTH_STATUSES, SYNC_STATUSES};

/// Parent uids as reported by the server. Most resources have exactly one owner.
pub type ParentRefs = SmallVec<[String; 2]>;

/// A single resource reported by the server for one application tree fetch.
///
/// `uid` is only meaningful within the batch it came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceRecord {
    pub uid: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub group: String,
    /// Health as reported; `None` becomes [`DEFAULT_HEALTH`].
    #[serde(default)]
    pub health: Option<String>,
    /// Sync status derived by the client; `None` becomes [`DEFAULT_SYNC`].
    #[serde(default)]
    pub sync: Option<String>,
    #[serde(default)]
    pub parent_refs: ParentRefs,
}

/// Stable logical identity of a tree node across independent fetches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl NodeKey {
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { kind: kind.into(), namespace: namespace.into(), name: name.into() }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.kind, self.namespace, self.name)
    }
}

/// A node of the display forest. Children are owned by their parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeNode {
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub health: String,
    pub sync: String,
    pub children: Vec<TreeNode>,
    pub expanded: bool,
    /// Parent uids beyond the one used for attachment.
    #[serde(default)]
    pub extra_parents: ParentRefs,
}

impl TreeNode {
    pub fn from_record(rec: &ResourceRecord, expanded: bool) -> Self {
        Self {
            kind: rec.kind.clone(),
            name: rec.name.clone(),
            namespace: rec.namespace.clone(),
            health: rec.health.clone().filter(|h| !h.is_empty()).unwrap_or_else(|| DEFAULT_HEALTH.to_string()),
            sync: rec.sync.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| DEFAULT_SYNC.to_string()),
            children: Vec::new(),
            expanded,
            extra_parents: SmallVec::new(),
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind.clone(), self.namespace.clone(), self.name.clone())
    }

    pub fn has_children(&self) -> bool { !self.children.is_empty() }

    /// Total number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Lower-cased text used for free-text search.
    pub fn search_string(&self) -> String {
        format!("{} {} {} {} {}", self.kind, self.name, self.namespace, self.health, self.sync).to_lowercase()
    }
}

/// Total node count of a forest.
pub fn forest_len(roots: &[TreeNode]) -> usize {
    roots.iter().map(TreeNode::count).sum()
}

/// One visible line of a projected tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreeRow {
    pub key: NodeKey,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub health: String,
    pub sync: String,
    pub depth: usize,
    pub is_last: bool,
    pub has_children: bool,
    pub expanded: bool,
    /// Per ancestor level below the root: true when a vertical guide continues through this row.
    pub guides: Vec<bool>,
    pub prefix: String,
    pub tone: RowTone,
}

impl TreeRow {
    pub fn search_string(&self) -> String {
        format!("{} {} {} {} {}", self.kind, self.name, self.namespace, self.health, self.sync).to_lowercase()
    }

    /// Drop tree decoration for tabular (non-structural) result lists.
    pub fn into_flat(mut self) -> Self {
        self.prefix.clear();
        self.guides.clear();
        self
    }

    /// Kind column text: tree prefix followed by the kind.
    pub fn kind_label(&self) -> String { format!("{}{}", self.prefix, self.kind) }
}

/// A managed application as listed by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Application {
    pub name: String,
    pub health: String,
    pub sync: String,
    pub project: String,
    pub sync_commit: String,
    pub last_activity: String,
}

impl Default for Application {
    fn default() -> Self {
        Self {
            name: String::new(),
            health: String::new(),
            sync: String::new(),
            project: String::new(),
            sync_commit: "n/a".to_string(),
            last_activity: "n/a".to_string(),
        }
    }
}

impl Application {
    pub fn search_string(&self) -> String {
        [
            self.name.as_str(),
            self.health.as_str(),
            self.project.as_str(),
            self.sync.as_str(),
            self.sync_commit.as_str(),
            self.last_activity.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// Non-fatal conditions reported by the tree engine.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngineError {
    #[error("identity_not_found: {0}")]
    IdentityNotFound(NodeKey),
    #[error("empty_result: no resources match {dimension}={value}")]
    EmptyResult { dimension: String, value: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

pub mod prelude {
    pub use super::{
        Application, EngineError, EngineResult, FilterDimension, FilterState, NodeKey, ResourceRecord, RowTone,
        TreeNode, TreeRow,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(uid: &str, kind: &str, name: &str) -> ResourceRecord {
        ResourceRecord { uid: uid.into(), kind: kind.into(), name: name.into(), namespace: "default".into(), ..Default::default() }
    }

    #[test]
    fn node_defaults_health_and_sync() {
        let n = TreeNode::from_record(&rec("1", "Pod", "web"), true);
        assert_eq!(n.health, "Unknown");
        assert_eq!(n.sync, "Synced");
        let mut r = rec("2", "Pod", "api");
        r.health = Some(String::new());
        assert_eq!(TreeNode::from_record(&r, true).health, "Unknown", "empty health falls back to default");
    }

    #[test]
    fn node_key_display_is_pipe_separated() {
        let k = NodeKey::new("Deployment", "prod", "web");
        assert_eq!(k.to_string(), "Deployment|prod|web");
    }

    #[test]
    fn application_search_string_joins_fields_lowercase() {
        let app = Application {
            name: "Web".into(),
            health: "Healthy".into(),
            sync: "Synced".into(),
            project: "Default".into(),
            ..Default::default()
        };
        assert_eq!(app.search_string(), "web healthy default synced n/a n/a");
    }

    #[test]
    fn resource_search_string_includes_statuses() {
        let mut r = rec("1", "Ingress", "Front");
        r.health = Some("Healthy".into());
        let n = TreeNode::from_record(&r, true);
        assert_eq!(n.search_string(), "ingress front default healthy synced");
    }
}
