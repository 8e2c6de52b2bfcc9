use std::sync::Arc;

use crate::error::Result;
use crate::pagerank::node::{Node, NodeId};
use crate::rdd::{PairRdd, Rdd};

/// Orders the nodes by weight, heaviest first, as `(id, weight)` pairs.
/// Nodes with equal weights come out in no particular order.
pub fn format_output(
    nodes: Arc<dyn Rdd<Item = Node>>,
    num_partitions: usize,
) -> Result<Arc<dyn Rdd<Item = (NodeId, f64)>>> {
    let sorted = nodes
        .map(|node: Node| (node.weight, node.id))
        .sort_by_key(false, num_partitions)?;
    Ok(sorted.map(|(weight, id): (f64, NodeId)| (id, weight)))
}
