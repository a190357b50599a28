//! Communication graph over the edge list.
//!
//! Vertices are email addresses; parallel edges between the same ordered pair
//! collapse into one graph edge that counts its messages. Each graph edge also
//! carries a `weight`, initially the message count, which pair scoring can
//! replace with a similarity or correlation score.
//!
//! Storage is a `petgraph` directed graph with an address → node index map.

pub mod components;
pub mod gexf;

pub use components::{connected_components, filter_by_weight, largest_component, subgraph};

use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::extract::Edge;

/// Aggregate of all messages from one address to another.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Number of messages sent along this edge.
    pub messages: usize,
    pub weight: f64,
}

/// Directed, weighted communication graph.
#[derive(Debug, Clone, Default)]
pub struct CommGraph {
    graph: DiGraph<String, Link>,
    index: HashMap<String, NodeIndex>,
}

impl CommGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of an edge list. Vertex order follows first appearance.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_message(&edge.from, &edge.to);
        }
        log::debug!(
            "built graph with {} vertices and {} edges from {} messages",
            graph.node_count(),
            graph.edge_count(),
            edges.len()
        );
        graph
    }

    /// Node for `address`, created on first use.
    pub fn add_vertex(&mut self, address: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(address) {
            return idx;
        }
        let idx = self.graph.add_node(address.to_string());
        self.index.insert(address.to_string(), idx);
        idx
    }

    /// Count one more message from `from` to `to`.
    pub fn add_message(&mut self, from: &str, to: &str) -> EdgeIndex {
        let source = self.add_vertex(from);
        let target = self.add_vertex(to);
        match self.graph.find_edge(source, target) {
            Some(edge) => {
                let link = &mut self.graph[edge];
                link.messages += 1;
                link.weight += 1.0;
                edge
            }
            None => self.graph.add_edge(
                source,
                target,
                Link {
                    messages: 1,
                    weight: 1.0,
                },
            ),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.index.contains_key(address)
    }

    pub fn link(&self, from: &str, to: &str) -> Option<&Link> {
        let source = *self.index.get(from)?;
        let target = *self.index.get(to)?;
        self.graph
            .find_edge(source, target)
            .map(|edge| &self.graph[edge])
    }

    /// Addresses in node index order.
    pub fn vertices(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_indices().map(|idx| self.graph[idx].as_str())
    }

    /// `(from, to, link)` for every edge, in edge index order.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str, &Link)> + '_ {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].as_str(),
                self.graph[edge.target()].as_str(),
                edge.weight(),
            )
        })
    }

    /// Replace every edge weight with `f(from, to, link)`.
    pub fn reweight<F>(&mut self, mut f: F)
    where
        F: FnMut(&str, &str, &Link) -> f64,
    {
        let edges: Vec<EdgeIndex> = self.graph.edge_indices().collect();
        for edge in edges {
            let Some((source, target)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            let weight = f(&self.graph[source], &self.graph[target], &self.graph[edge]);
            self.graph[edge].weight = weight;
        }
    }

    pub fn as_petgraph(&self) -> &DiGraph<String, Link> {
        &self.graph
    }

    pub(crate) fn from_petgraph(graph: DiGraph<String, Link>) -> Self {
        let index = graph
            .node_indices()
            .map(|idx| (graph[idx].clone(), idx))
            .collect();
        Self { graph, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parallel_messages_collapse() {
        let date = Utc.with_ymd_and_hms(2001, 5, 15, 9, 0, 0).unwrap();
        let edges = vec![
            Edge::new(date, "a@x.com", "b@x.com"),
            Edge::new(date, "a@x.com", "b@x.com"),
            Edge::new(date, "b@x.com", "a@x.com"),
            Edge::new(date, "c@x.com", "c@x.com"),
        ];
        let graph = CommGraph::from_edges(&edges);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.link("a@x.com", "b@x.com").unwrap().messages, 2);
        assert_eq!(graph.link("b@x.com", "a@x.com").unwrap().weight, 1.0);
        assert!(graph.link("a@x.com", "c@x.com").is_none());
        assert_eq!(
            graph.vertices().collect::<Vec<_>>(),
            vec!["a@x.com", "b@x.com", "c@x.com"]
        );
    }

    #[test]
    fn test_reweight() {
        let mut graph = CommGraph::new();
        graph.add_message("a@x.com", "b@x.com");
        graph.add_message("a@x.com", "b@x.com");
        graph.reweight(|_, _, link| link.messages as f64 * 10.0);
        assert_eq!(graph.link("a@x.com", "b@x.com").unwrap().weight, 20.0);
    }
}
