use std::fs;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use mailnet::dataset::{self, EdgeWriter};
use mailnet::extract::{self, EdgeListBuilder};

fn message(from: &str, to: &str, date: &str) -> String {
    format!(
        "Message-ID: <{from}.{date}>\nDate: {date}\nFrom: {from}\nTo: {to}\nSubject: status\n\nbody text\n"
    )
}

fn corpus() -> Vec<String> {
    vec![
        message(
            "phillip.allen@enron.com",
            "tim.belden@enron.com",
            "Mon, 14 May 2001 16:39:00 -0700 (PDT)",
        ),
        message(
            "john.lavorato@enron.com",
            "a@enron.com, b@enron.com, c@enron.com",
            "Fri, 4 May 2001 13:51:00 -0700 (PDT)",
        ),
        "Message-ID: <broken>\nTo: a@enron.com\nDate: Fri, 4 May 2001 13:51:00 -0700\n\nno sender"
            .to_string(),
        message("a@enron.com", "john.lavorato@enron.com", "never"),
        message(
            "b@enron.com",
            "phillip.allen@enron.com",
            "Wed, 18 Oct 2000 03:00:00 -0700 (PDT)",
        ),
    ]
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[test]
fn build_is_order_preserving_across_batches() {
    let messages = corpus();
    let (head, tail) = messages.split_at(2);

    let whole = extract::build(&messages);
    let mut pieces = extract::build(head);
    pieces.extend(extract::build(tail));

    assert_eq!(whole, pieces);
    assert_eq!(whole.len(), 5);
}

#[test]
fn multi_recipient_message_fans_out_in_order() {
    let edges = extract::build(&corpus()[1..2]);
    let recipients: Vec<&str> = edges.iter().map(|e| e.to.as_str()).collect();
    assert_eq!(recipients, vec!["a@enron.com", "b@enron.com", "c@enron.com"]);
    assert!(edges.iter().all(|e| e.from == "john.lavorato@enron.com"));
    assert!(edges.iter().all(|e| e.timestamp == edges[0].timestamp));
}

#[test]
fn missing_sender_yields_no_edges() {
    let edges = extract::build(&corpus()[2..3]);
    assert!(edges.is_empty());
}

#[test]
fn corpus_file_to_edge_list_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("emails.csv.gz");
    let output = dir.path().join("edges.csv");

    let mut csv_text = String::from("file,message\n");
    for (i, raw) in corpus().iter().enumerate() {
        csv_text.push_str(&format!("allen-p/{i}.,{}\n", csv_quote(raw)));
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(csv_text.as_bytes()).unwrap();
    fs::write(&input, encoder.finish().unwrap()).unwrap();

    let messages = dataset::read_messages(&input).unwrap();
    let mut writer = EdgeWriter::create(&output).unwrap();
    let builder = EdgeListBuilder::new(2, 2).unwrap();
    let stats = builder
        .build_streaming(messages, |edge| writer.write(edge))
        .unwrap();
    writer.finish().unwrap();

    assert_eq!(stats.messages, 5);
    assert_eq!(stats.extracted, 3);
    assert_eq!(stats.edges, 5);
    assert_eq!(stats.missing_from, 1);
    assert_eq!(stats.invalid_date, 1);

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("Date,From,To\n"));

    let edges = dataset::read_edges(&output).unwrap();
    assert_eq!(edges, extract::build(&corpus()));
}

#[test]
fn missing_input_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(dataset::read_messages(dir.path().join("absent.csv")).is_err());
    assert!(dataset::read_edges(dir.path().join("absent.csv")).is_err());
}
