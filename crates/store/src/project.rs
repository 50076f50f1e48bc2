//! Pre-order projection of a forest into display rows.

#![forbid(unsafe_code)]

use argonaut_core::{RowTone, TreeNode, TreeRow};

const EXPANDED: &str = "▼ ";
const COLLAPSED: &str = "▶ ";
const BLANK: &str = "  ";
const GUIDE: &str = "│ ";
const BRANCH: &str = "├─";
const BRANCH_LAST: &str = "└─";

/// Visible rows: descends only into expanded nodes.
pub fn flatten(roots: &[TreeNode]) -> Vec<TreeRow> {
    let mut out = Vec::new();
    walk(roots, 0, &mut Vec::new(), true, &mut out);
    out
}

/// Every node regardless of expansion state.
pub fn flatten_all(roots: &[TreeNode]) -> Vec<TreeRow> {
    let mut out = Vec::new();
    walk(roots, 0, &mut Vec::new(), false, &mut out);
    out
}

fn walk(nodes: &[TreeNode], depth: usize, guides: &mut Vec<bool>, respect_expanded: bool, out: &mut Vec<TreeRow>) {
    let n = nodes.len();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == n;
        out.push(row(node, depth, is_last, guides));
        if node.has_children() && (node.expanded || !respect_expanded) {
            // Root level draws no connectors, so it contributes no guide column.
            if depth > 0 {
                guides.push(!is_last);
            }
            walk(&node.children, depth + 1, guides, respect_expanded, out);
            if depth > 0 {
                guides.pop();
            }
        }
    }
}

fn row(node: &TreeNode, depth: usize, is_last: bool, guides: &[bool]) -> TreeRow {
    TreeRow {
        key: node.key(),
        kind: node.kind.clone(),
        name: node.name.clone(),
        namespace: node.namespace.clone(),
        health: node.health.clone(),
        sync: node.sync.clone(),
        depth,
        is_last,
        has_children: node.has_children(),
        expanded: node.expanded,
        guides: guides.to_vec(),
        prefix: prefix(depth, guides, is_last, node.has_children(), node.expanded),
        tone: RowTone::for_statuses(&node.health, &node.sync),
    }
}

/// Connector string for a row: inherited guides, branch glyph, then the expansion marker.
pub fn prefix(depth: usize, guides: &[bool], is_last: bool, has_children: bool, expanded: bool) -> String {
    let marker = match (has_children, expanded) {
        (true, true) => EXPANDED,
        (true, false) => COLLAPSED,
        (false, _) => BLANK,
    };
    if depth == 0 {
        return marker.to_string();
    }
    let mut s = String::with_capacity(depth * 6 + 4);
    for g in guides.iter().take(depth - 1) {
        s.push_str(if *g { GUIDE } else { BLANK });
    }
    s.push_str(if is_last { BRANCH_LAST } else { BRANCH });
    s.push_str(marker);
    s
}
