//! Pairwise vertex scoring.
//!
//! Every unordered pair of vertices joined by at least one graph edge is
//! scored from the two vertices' activity series. Pairs are independent and
//! scored in parallel; results are sorted by address so runs are reproducible.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use serde::Serialize;

use crate::graph::CommGraph;
use crate::series::{TimeSeries, WindowParams, correlate, similarity, windowed_similarity};

/// Scores of one vertex pair, `a < b`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairScore {
    pub a: String,
    pub b: String,
    /// Messages exchanged in either direction.
    pub messages: usize,
    pub similarity: f64,
    pub windowed_similarity: f64,
    pub correlation: f64,
}

/// Which score becomes the graph edge weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum WeightScore {
    #[default]
    Similarity,
    WindowedSimilarity,
    Correlation,
}

impl PairScore {
    pub fn get(&self, score: WeightScore) -> f64 {
        match score {
            WeightScore::Similarity => self.similarity,
            WeightScore::WindowedSimilarity => self.windowed_similarity,
            WeightScore::Correlation => self.correlation,
        }
    }
}

/// Unordered vertex pairs joined by an edge, with their message totals.
///
/// Self-loops are skipped.
fn linked_pairs(graph: &CommGraph) -> Vec<(String, String, usize)> {
    let mut totals: HashMap<(&str, &str), usize> = HashMap::new();
    for (from, to, link) in graph.links() {
        if from == to {
            continue;
        }
        let key = if from < to { (from, to) } else { (to, from) };
        *totals.entry(key).or_insert(0) += link.messages;
    }
    let ordered: BTreeSet<_> = totals
        .into_iter()
        .map(|((a, b), messages)| (a.to_string(), b.to_string(), messages))
        .collect();
    ordered.into_iter().collect()
}

/// Score all linked vertex pairs of `graph`.
///
/// `params.filtered` applies to all three scores. Vertices without a series
/// are scored against an empty one.
pub fn score_pairs(
    graph: &CommGraph,
    series: &HashMap<String, TimeSeries>,
    params: &WindowParams,
) -> Vec<PairScore> {
    let empty = TimeSeries::new();
    let pairs = linked_pairs(graph);
    log::info!("scoring {} vertex pairs", pairs.len());

    pairs
        .into_par_iter()
        .map(|(a, b, messages)| {
            let sa = series.get(&a).unwrap_or(&empty);
            let sb = series.get(&b).unwrap_or(&empty);
            PairScore {
                similarity: similarity(sa, sb, params.filtered),
                windowed_similarity: windowed_similarity(sa, sb, params),
                correlation: correlate(sa, sb, params.start, params.stop, params.filtered),
                a,
                b,
                messages,
            }
        })
        .collect()
}

/// Replace the weight of every graph edge with the chosen pair score.
///
/// Both directions of a pair get the same weight; self-loops get `0.0`.
pub fn apply_scores(graph: &mut CommGraph, scores: &[PairScore], score: WeightScore) {
    let lookup: HashMap<(&str, &str), f64> = scores
        .iter()
        .map(|s| ((s.a.as_str(), s.b.as_str()), s.get(score)))
        .collect();
    graph.reweight(|from, to, _| {
        let key = if from < to { (from, to) } else { (to, from) };
        lookup.get(&key).copied().unwrap_or(0.0)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> CommGraph {
        let mut graph = CommGraph::new();
        graph.add_message("b@x.com", "a@x.com");
        graph.add_message("a@x.com", "b@x.com");
        graph.add_message("a@x.com", "c@x.com");
        graph.add_message("c@x.com", "c@x.com");
        graph
    }

    #[test]
    fn test_linked_pairs_are_unordered_and_sorted() {
        let pairs = linked_pairs(&graph());
        assert_eq!(
            pairs,
            vec![
                ("a@x.com".to_string(), "b@x.com".to_string(), 2),
                ("a@x.com".to_string(), "c@x.com".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_score_pairs_and_apply() {
        let mut series = HashMap::new();
        series.insert("a@x.com".to_string(), TimeSeries::from([(1, 1.0), (2, 2.0)]));
        series.insert("b@x.com".to_string(), TimeSeries::from([(1, 1.0), (2, 2.0)]));
        let params = WindowParams {
            filtered: false,
            ..WindowParams::new(0, 10)
        };

        let mut g = graph();
        let scores = score_pairs(&g, &series, &params);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].similarity, 2.0);
        assert_eq!(scores[0].windowed_similarity, 2.0);
        assert!((scores[0].correlation - 1.0).abs() < 1e-9);
        // c has no series
        assert_eq!(scores[1].similarity, 0.0);
        assert_eq!(scores[1].correlation, 0.0);

        apply_scores(&mut g, &scores, WeightScore::Similarity);
        assert_eq!(g.link("b@x.com", "a@x.com").unwrap().weight, 2.0);
        assert_eq!(g.link("a@x.com", "c@x.com").unwrap().weight, 0.0);
        assert_eq!(g.link("c@x.com", "c@x.com").unwrap().weight, 0.0);
    }
}
