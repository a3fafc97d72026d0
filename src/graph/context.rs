//! Graph Builder
//!
//! `AnalysisContext` bundles the node map, the edge list and the adjacency
//! built from them. Every engine function takes one by reference; nothing
//! in the crate reaches for a shared graph.
//!
//! Edges are admitted into the adjacency in list order. An edge whose
//! endpoint is missing from the node map, or that repeats an already
//! admitted (from, to) pair, is kept out of traversal and out of every rule.

use rustc_hash::FxHashMap;
use tracing::warn;

use super::model::{Edge, Node, NodeMap, NodeType};

/// Read-only view of one model for one analysis pass.
#[derive(Debug)]
pub struct AnalysisContext<'a> {
    nodes: &'a NodeMap,
    edges: &'a [Edge],
    /// Indices into `edges` of admitted edges, in list order
    admitted: Vec<usize>,
    /// node id -> admitted outgoing edge indices
    outgoing: FxHashMap<&'a str, Vec<usize>>,
    /// node id -> admitted incoming edge indices
    incoming: FxHashMap<&'a str, Vec<usize>>,
    /// from -> to -> edge index
    pairs: FxHashMap<&'a str, FxHashMap<&'a str, usize>>,
}

impl<'a> AnalysisContext<'a> {
    /// Build the adjacency in O(N + E).
    pub fn build(nodes: &'a NodeMap, edges: &'a [Edge]) -> Self {
        let mut ctx = Self {
            nodes,
            edges,
            admitted: Vec::with_capacity(edges.len()),
            outgoing: FxHashMap::default(),
            incoming: FxHashMap::default(),
            pairs: FxHashMap::default(),
        };

        for (idx, edge) in edges.iter().enumerate() {
            if !nodes.contains_key(&edge.from) || !nodes.contains_key(&edge.to) {
                warn!(
                    "Edge {} references a missing node ({} -> {}); ignoring",
                    edge.id, edge.from, edge.to
                );
                continue;
            }
            let targets = ctx.pairs.entry(edge.from.as_str()).or_default();
            if let Some(&first) = targets.get(edge.to.as_str()) {
                warn!(
                    "Edge {} duplicates {} for {} -> {}; keeping the first",
                    edge.id, edges[first].id, edge.from, edge.to
                );
                continue;
            }
            targets.insert(edge.to.as_str(), idx);
            ctx.outgoing.entry(edge.from.as_str()).or_default().push(idx);
            ctx.incoming.entry(edge.to.as_str()).or_default().push(idx);
            ctx.admitted.push(idx);
        }

        ctx
    }

    pub fn nodes(&self) -> &'a NodeMap {
        self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Admitted edges, in list order.
    pub fn edges(&self) -> impl Iterator<Item = &'a Edge> + '_ {
        let edges = self.edges;
        self.admitted.iter().map(move |&i| &edges[i])
    }

    pub fn edge_count(&self) -> usize {
        self.admitted.len()
    }

    /// Outgoing admitted edges of `id`.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &'a Edge> + '_ {
        let edges = self.edges;
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &edges[i])
    }

    /// Incoming admitted edges of `id`.
    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &'a Edge> + '_ {
        let edges = self.edges;
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&i| &edges[i])
    }

    /// Successor ids of `id`.
    pub fn neighbors(&self, id: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.outgoing(id).map(|e| e.to.as_str())
    }

    pub fn edge_between(&self, from: &str, to: &str) -> Option<&'a Edge> {
        self.pairs
            .get(from)
            .and_then(|targets| targets.get(to))
            .map(|&i| &self.edges[i])
    }

    /// The edges connecting consecutive nodes of `path`.
    pub fn path_edges(&self, path: &[String]) -> Vec<&'a Edge> {
        path.windows(2)
            .filter_map(|w| self.edge_between(&w[0], &w[1]))
            .collect()
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &'a Node> + '_ {
        self.nodes.values().filter(move |n| n.node_type == node_type)
    }

    pub fn has_type(&self, node_type: NodeType) -> bool {
        self.nodes.values().any(|n| n.node_type == node_type)
    }

    /// Node ids matching a predicate, in model order.
    pub fn select<F>(&self, predicate: F) -> Vec<&'a Node>
    where
        F: Fn(&Node) -> bool,
    {
        self.nodes.values().filter(|n| predicate(n)).collect()
    }
}
