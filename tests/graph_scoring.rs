use std::fs;

use chrono::{Duration, TimeZone, Utc};
use mailnet::graph::{self, CommGraph, gexf};
use mailnet::scoring::{self, WeightScore};
use mailnet::series::{self, Activity, Bucketing, TimeSeries, WindowParams};
use mailnet::{Edge, dataset};

fn edges() -> Vec<Edge> {
    let t0 = Utc.with_ymd_and_hms(2001, 5, 14, 8, 0, 0).unwrap();
    let at = |hours: i64| t0 + Duration::hours(hours);
    vec![
        // a and b talk in the same hours
        Edge::new(at(0), "a@x.com", "b@x.com"),
        Edge::new(at(1), "b@x.com", "a@x.com"),
        Edge::new(at(3), "a@x.com", "b@x.com"),
        // c only hears from a once
        Edge::new(at(5), "a@x.com", "c@x.com"),
        // separate pair
        Edge::new(at(2), "d@x.com", "e@x.com"),
    ]
}

#[test]
fn similarity_properties_hold_on_activity_series() {
    let edges = edges();
    let bucketing = Bucketing::hourly_from(&edges).unwrap();
    let activity = series::activity_series(&edges, &bucketing, Activity::Both);

    let a = &activity["a@x.com"];
    assert_eq!(series::similarity(a, a, false), a.len() as f64);

    let d = &activity["d@x.com"];
    assert_eq!(series::similarity(a, d, true), 0.0);
    assert_eq!(series::correlate(a, d, -1, 100, true), 0.0);
}

#[test]
fn threshold_example_similarity() {
    let a = TimeSeries::from([(1, 2.0), (2, 4.0)]);
    let b = TimeSeries::from([(1, 2.0), (2, 2.0)]);
    assert_eq!(series::similarity(&a, &b, false), 0.5);
}

#[test]
fn scored_graph_reduces_and_exports() {
    let edges = edges();
    let bucketing = Bucketing::hourly_from(&edges).unwrap();
    let activity = series::activity_series(&edges, &bucketing, Activity::Both);
    let mut network = CommGraph::from_edges(&edges);

    let labels = graph::connected_components(&network);
    assert_eq!(labels["a@x.com"], labels["c@x.com"]);
    assert_ne!(labels["a@x.com"], labels["d@x.com"]);

    let params = WindowParams {
        filtered: false,
        ..WindowParams::new(-1, 10)
    };
    let scores = scoring::score_pairs(&network, &activity, &params);
    assert_eq!(scores.len(), 3);
    let ab = scores
        .iter()
        .find(|s| s.a == "a@x.com" && s.b == "b@x.com")
        .unwrap();
    assert_eq!(ab.messages, 3);
    assert_eq!(ab.similarity, 3.0);

    scoring::apply_scores(&mut network, &scores, WeightScore::Similarity);
    let strong = graph::largest_component(&graph::filter_by_weight(&network, 1.0));
    assert_eq!(strong.node_count(), 2);
    assert!(strong.link("a@x.com", "b@x.com").is_some());
    assert!(strong.link("b@x.com", "a@x.com").is_some());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.gexf");
    gexf::export_gexf(&strong, &path, true).unwrap();
    let xml = fs::read_to_string(&path).unwrap();
    assert_eq!(xml.matches("<node ").count(), 2);
    assert_eq!(xml.matches("<edge ").count(), 2);
    assert!(xml.contains(r#"weight="3""#));
}

#[test]
fn edge_list_round_trip_feeds_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edges.csv");
    dataset::write_edges(&path, &edges()).unwrap();

    let loaded = dataset::read_edges(&path).unwrap();
    assert_eq!(loaded, edges());
    let network = CommGraph::from_edges(&loaded);
    assert_eq!(network.node_count(), 5);
    assert_eq!(network.edge_count(), 4);
}
