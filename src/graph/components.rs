//! Connected components and graph reduction.
//!
//! Components are weakly connected: edge direction is ignored. Component ids
//! are dense, starting at 0, and assigned in order of each component's first
//! vertex, so labeling is stable for a given graph.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use super::CommGraph;

/// Label every vertex with the id of its weakly connected component.
pub fn connected_components(graph: &CommGraph) -> HashMap<String, usize> {
    let inner = graph.as_petgraph();
    let mut sets = UnionFind::new(inner.node_count());
    for edge in inner.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    let mut ids: HashMap<usize, usize> = HashMap::new();
    let mut labels = HashMap::with_capacity(inner.node_count());
    for idx in inner.node_indices() {
        let root = sets.find(idx.index());
        let next = ids.len();
        let id = *ids.entry(root).or_insert(next);
        labels.insert(inner[idx].clone(), id);
    }
    labels
}

/// Induced subgraph on the vertices accepted by `keep`.
///
/// Edges survive when both endpoints do. Weights and message counts are kept.
pub fn subgraph<F>(graph: &CommGraph, keep: F) -> CommGraph
where
    F: Fn(&str) -> bool,
{
    let filtered = graph.as_petgraph().filter_map(
        |_, address| keep(address).then(|| address.clone()),
        |_, link| Some(link.clone()),
    );
    CommGraph::from_petgraph(filtered)
}

/// Largest connected component (LCC) as an induced subgraph.
///
/// Ties go to the component whose first vertex comes first. An empty graph
/// yields an empty graph.
pub fn largest_component(graph: &CommGraph) -> CommGraph {
    let labels = connected_components(graph);
    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for id in labels.values() {
        *sizes.entry(*id).or_insert(0) += 1;
    }

    let Some(largest) = sizes
        .iter()
        .max_by(|(id_a, size_a), (id_b, size_b)| size_a.cmp(size_b).then(id_b.cmp(id_a)))
        .map(|(id, _)| *id)
    else {
        return CommGraph::new();
    };

    log::debug!(
        "largest of {} components has {} of {} vertices",
        sizes.len(),
        sizes[&largest],
        graph.node_count()
    );
    subgraph(graph, |address| labels.get(address) == Some(&largest))
}

/// Copy of `graph` keeping only edges whose weight exceeds `min_weight`.
///
/// All vertices are kept, including ones left isolated.
pub fn filter_by_weight(graph: &CommGraph, min_weight: f64) -> CommGraph {
    let filtered = graph.as_petgraph().filter_map(
        |_, address| Some(address.clone()),
        |_, link| (link.weight > min_weight).then(|| link.clone()),
    );
    CommGraph::from_petgraph(filtered)
}
