//! Forest construction from flat, parent-referenced records.

#![forbid(unsafe_code)]

use std::collections::VecDeque;
use std::time::Instant;

use argonaut_core::{ResourceRecord, TreeNode};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Deepest level a node may sit at. A node that would land here is detached and
/// shown as a root instead; its parent stays in `extra_parents`.
pub const MAX_DEPTH: usize = 256;

/// Build a fully expanded forest.
pub fn build_forest(records: &[ResourceRecord]) -> Vec<TreeNode> {
    build_forest_with(records, true)
}

/// Build a forest with every node's `expanded` set to `expanded`.
///
/// Each record attaches to its first resolvable parent; the rest are kept in
/// `extra_parents`. A parent is unresolvable when it is missing from the batch,
/// is the record itself, or already descends from the record. Records without a
/// resolvable parent become roots in scan order.
pub fn build_forest_with(records: &[ResourceRecord], expanded: bool) -> Vec<TreeNode> {
    let t0 = Instant::now();
    let mut by_uid: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, r) in records.iter().enumerate() {
        by_uid.entry(r.uid.as_str()).or_insert(i);
    }

    let mut parent_of: Vec<Option<usize>> = vec![None; records.len()];
    for (i, r) in records.iter().enumerate() {
        for pref in r.parent_refs.iter() {
            let Some(&p) = by_uid.get(pref.as_str()) else { continue };
            if p == i || descends_from(&parent_of, p, i) {
                continue;
            }
            parent_of[i] = Some(p);
            break;
        }
    }

    let detached = cap_depth(&mut parent_of);
    if detached > 0 {
        warn!(detached, max_depth = MAX_DEPTH, "tree: parent chain too deep; nodes shown as roots");
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, p) in parent_of.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let forest = assemble(&roots, records, &parent_of, &children, &by_uid, expanded);
    metrics::histogram!("tree_build_ms", t0.elapsed().as_secs_f64() * 1000.0);
    debug!(records = records.len(), roots = forest.len(), "tree: forest built");
    forest
}

/// True when walking up from `start` reaches `target`. Assigned links never form a
/// cycle, so the walk ends within `parent_of.len()` steps.
fn descends_from(parent_of: &[Option<usize>], start: usize, target: usize) -> bool {
    let mut cur = Some(start);
    let mut steps = 0usize;
    while let Some(c) = cur {
        if c == target {
            return true;
        }
        steps += 1;
        if steps > parent_of.len() {
            return true;
        }
        cur = parent_of[c];
    }
    false
}

/// Cut every link that would place a node at `MAX_DEPTH` or deeper, so later
/// passes over the forest stay shallow. Returns the number of detached nodes.
fn cap_depth(parent_of: &mut [Option<usize>]) -> usize {
    let n = parent_of.len();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    for (i, p) in parent_of.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => queue.push_back((i, 0)),
        }
    }
    let mut detached = 0usize;
    while let Some((i, depth)) = queue.pop_front() {
        for &c in &children[i] {
            if depth + 1 >= MAX_DEPTH {
                parent_of[c] = None;
                detached += 1;
                queue.push_back((c, 0));
            } else {
                queue.push_back((c, depth + 1));
            }
        }
    }
    detached
}

/// Bottom-up assembly without recursion: nodes are built in reverse BFS order so
/// every child is finished before its parent takes it.
fn assemble(
    roots: &[usize],
    records: &[ResourceRecord],
    parent_of: &[Option<usize>],
    children: &[Vec<usize>],
    by_uid: &FxHashMap<&str, usize>,
    expanded: bool,
) -> Vec<TreeNode> {
    let mut order: Vec<usize> = Vec::with_capacity(records.len());
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(i) = queue.pop_front() {
        order.push(i);
        queue.extend(children[i].iter().copied());
    }

    let mut built: Vec<Option<TreeNode>> = vec![None; records.len()];
    for &i in order.iter().rev() {
        let rec = &records[i];
        let mut node = TreeNode::from_record(rec, expanded);
        let used = parent_of[i];
        node.extra_parents = rec
            .parent_refs
            .iter()
            .filter(|p| used.is_none() || by_uid.get(p.as_str()).copied() != used)
            .cloned()
            .collect::<SmallVec<_>>();
        node.children = children[i].iter().filter_map(|&c| built[c].take()).collect();
        built[i] = Some(node);
    }
    roots.iter().filter_map(|&i| built[i].take()).collect()
}
