use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::pagerank::node::NodeId;
use serde_derive::{Deserialize, Serialize};

/// A directed link `source -> target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Edge { source, target }
    }
}

fn malformed(line_number: usize, line: &str, reason: String) -> Error {
    Error::MalformedEdge {
        line_number,
        line: line.to_owned(),
        reason,
    }
}

fn parse_node_id(line_number: usize, line: &str, token: &str) -> Result<NodeId> {
    token
        .parse::<NodeId>()
        .map_err(|e| malformed(line_number, line, format!("invalid node id {:?}: {}", token, e)))
}

/// Parses one line of an edge list. Blank lines and `#` comments yield `None`.
///
/// `line_number` is 1-based and only used for error reporting.
pub fn parse_edge_line(line_number: usize, line: &str) -> Result<Option<Edge>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(malformed(
            line_number,
            line,
            format!("expected 2 node ids, found {}", tokens.len()),
        ));
    }
    let source = parse_node_id(line_number, line, tokens[0])?;
    let target = parse_node_id(line_number, line, tokens[1])?;
    Ok(Some(Edge::new(source, target)))
}

/// Parses a whole edge list, stopping at the first malformed line.
pub fn parse_edges(text: &str) -> Result<Vec<Edge>> {
    let mut edges = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(edge) = parse_edge_line(idx + 1, line)? {
            edges.push(edge);
        }
    }
    log::debug!("parsed {} edge(s)", edges.len());
    Ok(edges)
}

pub fn read_edges<P: AsRef<Path>>(path: P) -> Result<Vec<Edge>> {
    let path = path.as_ref();
    log::info!("reading edges from {}", path.display());
    let text = fs::read_to_string(path)?;
    parse_edges(&text)
}
