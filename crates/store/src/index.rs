//! Expansion state transitions and the identity index over a forest.

#![forbid(unsafe_code)]

use argonaut_core::{EngineError, EngineResult, NodeKey, TreeNode};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::warn;

/// Child-index path from the forest root list down to a node.
pub type NodePath = SmallVec<[usize; 8]>;

pub fn expand_fully(node: &mut TreeNode) {
    set_expanded(node, true);
}

pub fn collapse_fully(node: &mut TreeNode) {
    set_expanded(node, false);
}

fn set_expanded(node: &mut TreeNode, value: bool) {
    node.expanded = value;
    for c in node.children.iter_mut() {
        set_expanded(c, value);
    }
}

/// Maps identity keys to node positions. Rebuild after every forest rebuild.
#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    paths: FxHashMap<NodeKey, NodePath>,
    duplicates: usize,
}

impl IdentityIndex {
    /// Pre-order traversal; on duplicate keys the first occurrence wins.
    pub fn build(roots: &[TreeNode]) -> Self {
        let mut idx = IdentityIndex::default();
        let mut path = NodePath::new();
        for (i, r) in roots.iter().enumerate() {
            path.push(i);
            idx.visit(r, &mut path);
            path.pop();
        }
        if idx.duplicates > 0 {
            warn!(duplicates = idx.duplicates, "tree: duplicate identity keys; first occurrence is addressable");
        }
        idx
    }

    fn visit(&mut self, node: &TreeNode, path: &mut NodePath) {
        let key = node.key();
        if self.paths.contains_key(&key) {
            self.duplicates += 1;
        } else {
            self.paths.insert(key, path.clone());
        }
        for (i, c) in node.children.iter().enumerate() {
            path.push(i);
            self.visit(c, path);
            path.pop();
        }
    }

    pub fn len(&self) -> usize { self.paths.len() }
    pub fn is_empty(&self) -> bool { self.paths.is_empty() }
    pub fn duplicates(&self) -> usize { self.duplicates }
    pub fn contains(&self, key: &NodeKey) -> bool { self.paths.contains_key(key) }

    pub fn get<'a>(&self, roots: &'a [TreeNode], key: &NodeKey) -> Option<&'a TreeNode> {
        let path = self.paths.get(key)?;
        let (first, rest) = path.split_first()?;
        let mut cur = roots.get(*first)?;
        for i in rest {
            cur = cur.children.get(*i)?;
        }
        Some(cur)
    }

    pub fn get_mut<'a>(&self, roots: &'a mut [TreeNode], key: &NodeKey) -> Option<&'a mut TreeNode> {
        let path = self.paths.get(key)?;
        let (first, rest) = path.split_first()?;
        let mut cur = roots.get_mut(*first)?;
        for i in rest {
            cur = cur.children.get_mut(*i)?;
        }
        Some(cur)
    }
}

/// Toggle a node by key: expanded nodes collapse with their subtree, collapsed ones
/// expand with their subtree. Leaves are left alone.
///
/// Returns whether anything changed.
pub fn toggle_node(roots: &mut [TreeNode], index: &IdentityIndex, key: &NodeKey) -> EngineResult<bool> {
    let node = index.get_mut(roots, key).ok_or_else(|| EngineError::IdentityNotFound(key.clone()))?;
    if !node.has_children() {
        return Ok(false);
    }
    if node.expanded {
        collapse_fully(node);
    } else {
        expand_fully(node);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build_forest;
    use argonaut_core::ResourceRecord;

    fn rec(uid: &str, kind: &str, name: &str, parents: &[&str]) -> ResourceRecord {
        ResourceRecord {
            uid: uid.into(),
            kind: kind.into(),
            name: name.into(),
            namespace: "default".into(),
            parent_refs: parents.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<TreeNode> {
        build_forest(&[
            rec("1", "Deployment", "web", &[]),
            rec("2", "ReplicaSet", "web-1", &["1"]),
            rec("3", "Pod", "web-1-a", &["2"]),
            rec("4", "Service", "web", &[]),
        ])
    }

    #[test]
    fn index_addresses_every_node() {
        let roots = sample();
        let idx = IdentityIndex::build(&roots);
        assert_eq!(idx.len(), 4);
        let pod = idx.get(&roots, &NodeKey::new("Pod", "default", "web-1-a")).map(|n| n.name.as_str());
        assert_eq!(pod, Some("web-1-a"));
        assert!(idx.get(&roots, &NodeKey::new("Pod", "other", "web-1-a")).is_none());
    }

    #[test]
    fn duplicate_keys_keep_first_occurrence() {
        let roots = build_forest(&[
            rec("1", "ConfigMap", "cfg", &[]),
            rec("2", "Deployment", "d", &[]),
            rec("3", "ConfigMap", "cfg", &["2"]),
        ]);
        let idx = IdentityIndex::build(&roots);
        assert_eq!(idx.duplicates(), 1);
        let key = NodeKey::new("ConfigMap", "default", "cfg");
        let first = idx.get(&roots, &key).expect("indexed");
        assert!(std::ptr::eq(first, &roots[0]), "root occurrence wins");
    }

    #[test]
    fn toggle_collapses_then_expands_subtree() {
        let mut roots = sample();
        let idx = IdentityIndex::build(&roots);
        let key = NodeKey::new("Deployment", "default", "web");
        assert_eq!(toggle_node(&mut roots, &idx, &key), Ok(true));
        assert!(!roots[0].expanded);
        assert!(!roots[0].children[0].expanded, "collapse is recursive");
        assert!(roots[1].expanded, "siblings untouched");
        assert_eq!(toggle_node(&mut roots, &idx, &key), Ok(true));
        assert!(roots[0].children[0].expanded, "expand is recursive");
    }

    #[test]
    fn toggle_leaf_is_noop_and_stale_key_reports() {
        let mut roots = sample();
        let idx = IdentityIndex::build(&roots);
        let before = roots.clone();
        let mut leaves = Vec::new();
        let mut stack: Vec<&TreeNode> = before.iter().collect();
        while let Some(n) = stack.pop() {
            if n.children.is_empty() {
                leaves.push(n.key());
            }
            stack.extend(n.children.iter());
        }
        leaves.sort();
        assert_eq!(
            leaves,
            vec![NodeKey::new("Pod", "default", "web-1-a"), NodeKey::new("Service", "default", "web")]
        );
        for leaf in &leaves {
            assert_eq!(toggle_node(&mut roots, &idx, leaf), Ok(false), "{:?}", leaf);
            assert_eq!(roots, before, "{:?}", leaf);
        }
        let stale = NodeKey::new("Pod", "default", "gone");
        assert_eq!(toggle_node(&mut roots, &idx, &stale), Err(EngineError::IdentityNotFound(stale.clone())));
        assert_eq!(roots, before);
    }

    #[test]
    fn expand_and_collapse_are_idempotent() {
        let mut roots = sample();
        collapse_fully(&mut roots[0]);
        let once = roots.clone();
        collapse_fully(&mut roots[0]);
        assert_eq!(roots, once);
        expand_fully(&mut roots[0]);
        expand_fully(&mut roots[0]);
        assert!(roots[0].expanded && roots[0].children[0].children[0].expanded);
    }
}
