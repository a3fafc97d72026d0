//! Path & Reachability Engine
//!
//! BFS shortest path, forward reachability, bounded simple-path enumeration,
//! three-color cycle detection and trust-boundary counting over an
//! [`AnalysisContext`].
//!
//! Every function is total: unknown node ids give an empty result and the
//! visited sets make every walk terminate on cyclic input.

use indexmap::IndexSet;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use super::context::AnalysisContext;

/// Deepest path (in hops) the attack-path detector enumerates.
pub const MAX_PATH_DEPTH: usize = 6;

/// Hard cap on the number of paths enumerated from one start node.
pub const MAX_PATHS: usize = 200;

/// Unweighted BFS shortest path, inclusive of both endpoints.
///
/// `src == dst` yields the single-node path. Returns `None` when either id
/// is unknown or no path exists.
pub fn shortest_path(ctx: &AnalysisContext<'_>, src: &str, dst: &str) -> Option<Vec<String>> {
    if !ctx.contains(src) || !ctx.contains(dst) {
        return None;
    }
    if src == dst {
        return Some(vec![src.to_string()]);
    }

    let mut parent: FxHashMap<&str, &str> = FxHashMap::default();
    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(src);
    queue.push_back(src);

    while let Some(current) = queue.pop_front() {
        for next in ctx.neighbors(current) {
            if !visited.insert(next) {
                continue;
            }
            parent.insert(next, current);
            if next == dst {
                let mut path = vec![next.to_string()];
                let mut cursor = next;
                while let Some(&prev) = parent.get(cursor) {
                    path.push(prev.to_string());
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }

    None
}

/// Forward BFS closure from `src`, excluding `src` itself, in BFS order.
pub fn reachable_set(ctx: &AnalysisContext<'_>, src: &str) -> IndexSet<String> {
    let mut seen: IndexSet<String> = IndexSet::new();
    if !ctx.contains(src) {
        return seen;
    }

    let mut visited: FxHashSet<&str> = FxHashSet::default();
    let mut queue = VecDeque::new();
    visited.insert(src);
    queue.push_back(src);

    while let Some(current) = queue.pop_front() {
        for next in ctx.neighbors(current) {
            if visited.insert(next) {
                seen.insert(next.to_string());
                queue.push_back(next);
            }
        }
    }

    seen
}

/// BFS enumeration of simple paths starting at `start`.
///
/// Every extension of a path by one unvisited neighbor is recorded, up to
/// `max_depth` hops, so the result holds all prefixes, shortest first.
/// Enumeration stops the moment `max_count` paths have been collected.
pub fn all_paths_bounded(
    ctx: &AnalysisContext<'_>,
    start: &str,
    max_depth: usize,
    max_count: usize,
) -> Vec<Vec<String>> {
    let mut paths = Vec::new();
    if !ctx.contains(start) || max_count == 0 {
        return paths;
    }

    let mut queue: VecDeque<Vec<&str>> = VecDeque::new();
    queue.push_back(vec![start]);

    while let Some(path) = queue.pop_front() {
        // path.len() - 1 hops so far
        if path.len() > max_depth {
            continue;
        }
        let Some(&last) = path.last() else {
            continue;
        };
        for next in ctx.neighbors(last) {
            if path.contains(&next) {
                continue;
            }
            let mut extended = path.clone();
            extended.push(next);
            paths.push(extended.iter().map(|s| s.to_string()).collect());
            if paths.len() >= max_count {
                return paths;
            }
            queue.push_back(extended);
        }
    }

    paths
}

/// Three-color DFS cycle check over the whole graph.
pub fn has_cycle(ctx: &AnalysisContext<'_>) -> bool {
    let all: FxHashSet<&str> = ctx.nodes().keys().map(String::as_str).collect();
    has_cycle_within(ctx, &all)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Three-color DFS cycle check over the subgraph induced by `subset`.
///
/// Iterative, so deep chains do not exhaust the stack.
pub fn has_cycle_within(ctx: &AnalysisContext<'_>, subset: &FxHashSet<&str>) -> bool {
    let mut color: FxHashMap<&str, Color> = subset.iter().map(|&id| (id, Color::White)).collect();

    // Seed in model order so the walk is deterministic
    for root in ctx.nodes().keys().map(String::as_str) {
        if color.get(root) != Some(&Color::White) {
            continue;
        }

        let mut stack: Vec<(&str, Vec<&str>)> = Vec::new();
        color.insert(root, Color::Gray);
        stack.push((root, induced_neighbors(ctx, root, subset)));

        while let Some((node, pending)) = stack.last_mut() {
            match pending.pop() {
                Some(next) => match color.get(next).copied() {
                    Some(Color::Gray) => return true,
                    Some(Color::White) => {
                        color.insert(next, Color::Gray);
                        let succ = induced_neighbors(ctx, next, subset);
                        stack.push((next, succ));
                    }
                    _ => {}
                },
                None => {
                    let done = *node;
                    color.insert(done, Color::Black);
                    stack.pop();
                }
            }
        }
    }

    false
}

fn induced_neighbors<'a>(
    ctx: &AnalysisContext<'a>,
    id: &str,
    subset: &FxHashSet<&str>,
) -> Vec<&'a str> {
    let mut next: Vec<&'a str> = ctx.neighbors(id).filter(|n| subset.contains(n)).collect();
    // popped from the back, so reverse to visit in edge order
    next.reverse();
    next
}

/// Nodes of `subset` that sit on a cycle of the induced subgraph, grouped by
/// strongly connected component.
pub fn cycle_groups(ctx: &AnalysisContext<'_>, subset: &FxHashSet<&str>) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: FxHashMap<&str, NodeIndex> = FxHashMap::default();

    for id in ctx.nodes().keys().map(String::as_str) {
        if subset.contains(id) {
            index.insert(id, graph.add_node(id));
        }
    }
    for edge in ctx.edges() {
        if let (Some(&a), Some(&b)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
            graph.add_edge(a, b, ());
        }
    }

    let mut groups: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<NodeIndex> = scc;
            members.sort();
            members.into_iter().map(|i| graph[i].to_string()).collect()
        })
        .collect();
    groups.sort();
    groups
}

/// Number of consecutive path edges flagged as crossing a trust boundary.
///
/// Not deduplicated by zone: each flagged hop is another escalation
/// opportunity.
pub fn trust_boundary_crossings(ctx: &AnalysisContext<'_>, path: &[String]) -> usize {
    ctx.path_edges(path)
        .into_iter()
        .filter(|e| e.crosses_trust_boundary())
        .count()
}
