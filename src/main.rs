use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use mailnet::dataset::{self, EdgeWriter};
use mailnet::graph::{self, CommGraph, gexf};
use mailnet::scoring::{self, PairScore, WeightScore};
use mailnet::series::{self, Activity, Bucketing, TimeSeries, WindowParams};
use mailnet::{Config, Edge, EdgeListBuilder, Error};

#[derive(Parser, Debug)]
#[command(
    name = "mailnet",
    about = "Build an email communication network and score its vertices"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a Date,From,To edge list from a message corpus CSV.
    Extract {
        /// Corpus CSV with a `message` column (may be gzipped).
        #[arg(long)]
        input: PathBuf,

        /// Edge-list CSV to write.
        #[arg(long)]
        output: PathBuf,

        /// Worker threads (defaults to MAILNET_THREADS or the CPU count).
        #[arg(long)]
        threads: Option<usize>,

        /// Messages per parallel chunk.
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Build the communication graph and export it as GEXF.
    Graph {
        /// Edge-list CSV produced by `extract`.
        #[arg(long)]
        edges: PathBuf,

        /// GEXF file to write.
        #[arg(long)]
        output: PathBuf,

        /// Keep only the largest connected component.
        #[arg(long)]
        lcc: bool,

        /// Drop edges whose weight does not exceed this value.
        #[arg(long)]
        min_weight: Option<f64>,

        /// Weight edges by a pair score instead of the message count.
        #[arg(long, value_enum)]
        score: Option<WeightScore>,

        #[command(flatten)]
        series: SeriesArgs,
    },
    /// Score every linked vertex pair and write the scores as CSV.
    Score {
        /// Edge-list CSV produced by `extract`.
        #[arg(long)]
        edges: PathBuf,

        /// Score CSV to write.
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        series: SeriesArgs,
    },
}

#[derive(Args, Debug)]
struct SeriesArgs {
    /// Exclusive first bucket of the scoring window (default: before the first edge).
    #[arg(long, allow_hyphen_values = true)]
    start: Option<i64>,

    /// Exclusive last bucket of the scoring window (default: after the last edge).
    #[arg(long, allow_hyphen_values = true)]
    stop: Option<i64>,

    /// Bucket width in hours.
    #[arg(long)]
    bucket_hours: Option<i64>,

    /// Which edge endpoints count as activity.
    #[arg(long, value_enum, default_value_t = Activity::Both)]
    activity: Activity,

    /// Agreement threshold of the windowed similarity.
    #[arg(long)]
    lambda: Option<f64>,

    /// Pre-filter bound of the windowed similarity.
    #[arg(long)]
    lower_bound: Option<f64>,

    /// Compare raw counts instead of frequency-normalized ones.
    #[arg(long)]
    unfiltered: bool,
}

#[derive(Serialize)]
struct GraphSummary {
    vertices: usize,
    edges: usize,
    components: usize,
}

fn apply_series_args(config: &mut Config, args: &SeriesArgs) {
    if let Some(hours) = args.bucket_hours {
        config.bucket_hours = hours;
    }
    if let Some(lambda) = args.lambda {
        config.lambda = lambda;
    }
    if let Some(lower_bound) = args.lower_bound {
        config.lower_bound = lower_bound;
    }
    if args.unfiltered {
        config.filtered = false;
    }
}

/// Activity series of every address plus the window parameters to score with.
fn prepare_series(
    edges: &[Edge],
    config: &Config,
    args: &SeriesArgs,
) -> Result<(HashMap<String, TimeSeries>, WindowParams), Error> {
    let Some(first) = edges.iter().map(|e| e.timestamp).min() else {
        return Err(Error::invalid_argument("edge list is empty"));
    };
    let bucketing = Bucketing::new(first, config.bucket_width()?)?;
    let last_bucket = edges
        .iter()
        .map(|e| bucketing.bucket(e.timestamp))
        .max()
        .unwrap_or(0);

    let series = series::activity_series(edges, &bucketing, args.activity);
    let params = WindowParams {
        start: args.start.unwrap_or(-1),
        stop: args.stop.unwrap_or(last_bucket + 1),
        lambda: config.lambda,
        lower_bound: config.lower_bound,
        filtered: config.filtered,
    };
    log::info!(
        "{} series over buckets 0..={}, scoring window ({}, {})",
        series.len(),
        last_bucket,
        params.start,
        params.stop
    );
    Ok((series, params))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    mailnet::init_logger();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Command::Extract {
            input,
            output,
            threads,
            chunk_size,
        } => {
            if let Some(threads) = threads {
                config.threads = threads;
            }
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            log::info!(
                "extracting with {} threads, {} messages per chunk",
                config.threads,
                config.chunk_size
            );

            let messages = dataset::read_messages(&input)?;
            let mut writer = EdgeWriter::create(&output)?;
            let builder = EdgeListBuilder::new(config.threads, config.chunk_size)?;
            let stats = builder.build_streaming(messages, |edge| writer.write(edge))?;
            writer.finish()?;

            if stats.extracted == 0 && stats.messages > 0 {
                log::warn!("no message in {} had usable headers", input.display());
            }
            print_json(&stats)?;
        }
        Command::Graph {
            edges,
            output,
            lcc,
            min_weight,
            score,
            series,
        } => {
            apply_series_args(&mut config, &series);
            let edge_list = dataset::read_edges(&edges)?;
            let mut network = CommGraph::from_edges(&edge_list);

            if let Some(score) = score {
                let (activity, params) = prepare_series(&edge_list, &config, &series)?;
                let scores = scoring::score_pairs(&network, &activity, &params);
                scoring::apply_scores(&mut network, &scores, score);
            }
            if let Some(min_weight) = min_weight {
                network = graph::filter_by_weight(&network, min_weight);
            }
            if lcc {
                network = graph::largest_component(&network);
            }

            gexf::export_gexf(&network, &output, true)?;

            let labels = graph::connected_components(&network);
            let components = labels.values().copied().max().map_or(0, |id| id + 1);
            print_json(&GraphSummary {
                vertices: network.node_count(),
                edges: network.edge_count(),
                components,
            })?;
        }
        Command::Score {
            edges,
            output,
            series,
        } => {
            apply_series_args(&mut config, &series);
            let edge_list = dataset::read_edges(&edges)?;
            let network = CommGraph::from_edges(&edge_list);
            let (activity, params) = prepare_series(&edge_list, &config, &series)?;

            let scores: Vec<PairScore> = scoring::score_pairs(&network, &activity, &params);
            let mut writer = csv::Writer::from_path(&output)?;
            for score in &scores {
                writer.serialize(score)?;
            }
            writer.flush()?;
            log::info!("wrote {} pair scores to {}", scores.len(), output.display());
        }
    }

    Ok(())
}
