//! PageRank with a back-edge term.
//!
//! Every round each node keeps `0.05 * weight + 0.1 * old_weight` for itself
//! and passes `0.85 * weight` on, split evenly over its targets. A node without
//! targets spreads that share over every other node of the graph instead.

pub mod edges;
pub mod engine;
pub mod node;
pub mod output;
pub mod weights;

pub use edges::{parse_edge_line, parse_edges, read_edges, Edge};
pub use engine::{EngineState, PageRank};
pub use node::{Contribution, Node, NodeId, Targets};
pub use output::format_output;
pub use weights::{collect, collect_weights, distribute, distribute_weights, initialize_nodes};

use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;

/// Ranks the graph described by `text` after `iterations` rounds.
pub fn rank(
    context: &Arc<Context>,
    text: &str,
    iterations: usize,
    num_partitions: usize,
) -> Result<Vec<(NodeId, f64)>> {
    let edges = parse_edges(text)?;
    let mut engine = PageRank::with_partitions(context, edges, num_partitions)?;
    engine.run(iterations)?;
    engine.ranking()
}
