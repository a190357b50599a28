//! GEXF export.
//!
//! Emits a GEXF 1.2 document with one `<node>` per vertex and one `<edge>` per
//! graph edge. Node ids are the vertex indices; labels carry the address.
//! Edge labels are `from->to`. Weights are written when requested.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use petgraph::visit::EdgeRef;

use super::CommGraph;
use crate::error::Result;

/// Escape the five XML special characters for attribute values.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Serialize `graph` as GEXF into `out`.
pub fn write_gexf<W: Write>(graph: &CommGraph, out: &mut W, with_weights: bool) -> Result<()> {
    let inner = graph.as_petgraph();

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#
    )?;
    writeln!(out, r#"  <graph mode="static" defaultedgetype="directed">"#)?;

    writeln!(out, "    <nodes>")?;
    for idx in inner.node_indices() {
        let label = escape(&inner[idx]);
        writeln!(
            out,
            r#"      <node id="{}" label="{}" />"#,
            idx.index(),
            label
        )?;
    }
    writeln!(out, "    </nodes>")?;

    writeln!(out, "    <edges>")?;
    for edge in inner.edge_references() {
        let label = escape(&format!(
            "{}->{}",
            inner[edge.source()],
            inner[edge.target()]
        ));
        write!(
            out,
            r#"      <edge id="{}" source="{}" target="{}" label="{}""#,
            edge.id().index(),
            edge.source().index(),
            edge.target().index(),
            label
        )?;
        if with_weights {
            write!(out, r#" weight="{}""#, edge.weight().weight)?;
        }
        writeln!(out, " />")?;
    }
    writeln!(out, "    </edges>")?;

    writeln!(out, "  </graph>")?;
    writeln!(out, "</gexf>")?;
    Ok(())
}

/// Write `graph` as a GEXF file at `path`.
pub fn export_gexf(graph: &CommGraph, path: impl AsRef<Path>, with_weights: bool) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_gexf(graph, &mut out, with_weights)?;
    out.flush()?;
    log::info!(
        "exported {} vertices and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}
