//! The per-round map and reduce functions of the ranking, and the jobs that
//! apply them to a node collection.
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::pagerank::edges::Edge;
use crate::pagerank::node::{
    Contribution, Node, NodeId, Targets, CURRENT_RETENTION, DAMPING_FACTOR, PREVIOUS_RETENTION,
};
use crate::rdd::{PairRdd, Rdd, RddBase};

/// Builds one node per id mentioned in `edges`, each with the union of its
/// outgoing targets and the initial weight.
pub fn initialize_nodes(
    context: &Arc<Context>,
    edges: Vec<Edge>,
    num_partitions: usize,
) -> Arc<dyn Rdd<Item = Node>> {
    context
        .parallelize(edges, num_partitions)
        .flat_map(|edge: Edge| {
            let mut link = Targets::new();
            link.insert(edge.target);
            Box::new(
                vec![
                    (edge.source, link),
                    (edge.source, Targets::new()),
                    (edge.target, Targets::new()),
                ]
                .into_iter(),
            ) as Box<dyn Iterator<Item = (NodeId, Targets)>>
        })
        .reduce_by_key(
            |mut t1: Targets, mut t2: Targets| {
                t1.append(&mut t2);
                t1
            },
            num_partitions,
        )
        .map(|(id, targets): (NodeId, Targets)| Node::new(id, targets))
}

/// Map side of a round. `node_ids` is every id of the graph and is used to
/// spread the weight of a dangling node over all other nodes.
pub fn distribute(node: Node, node_ids: &[NodeId]) -> Vec<(NodeId, Contribution)> {
    let Node {
        id,
        old_weight,
        weight,
        targets,
    } = node;
    let mut out;

    if targets.is_empty() {
        let num_nodes = node_ids.len();
        // every other node plus the self tuple
        out = Vec::with_capacity(num_nodes.max(1));
        if num_nodes > 1 {
            let share = (DAMPING_FACTOR / (num_nodes - 1) as f64) * weight;
            out.extend(
                node_ids
                    .iter()
                    .filter(|&&other| other != id)
                    .map(|&other| (other, Contribution::Incoming(share))),
            );
        }
    } else {
        out = Vec::with_capacity(targets.len() + 1);
        let share = (DAMPING_FACTOR / targets.len() as f64) * weight;
        out.extend(
            targets
                .iter()
                .map(|&target| (target, Contribution::Incoming(share))),
        );
    }

    out.push((
        id,
        Contribution::Retained {
            old_weight: weight,
            decay: CURRENT_RETENTION * weight + PREVIOUS_RETENTION * old_weight,
            targets,
        },
    ));
    out
}

/// Reduce side of a round: rebuilds a node from everything addressed to it.
/// Exactly one of the contributions must be the node's own.
pub fn collect(id: NodeId, contributions: Vec<Contribution>) -> Result<Node> {
    let mut weight = 0.0;
    let mut retained: Option<(f64, Targets)> = None;
    for contribution in contributions {
        weight += contribution.weight_contrib();
        if let Contribution::Retained {
            old_weight,
            targets,
            ..
        } = contribution
        {
            if retained.replace((old_weight, targets)).is_some() {
                return Err(Error::DuplicateSelfContribution(id));
            }
        }
    }
    let (old_weight, targets) = retained.ok_or(Error::MissingSelfContribution(id))?;
    Ok(Node {
        id,
        old_weight,
        weight,
        targets,
    })
}

/// Lazily applies [`distribute`] to every node.
pub fn distribute_weights(
    nodes: &Arc<dyn Rdd<Item = Node>>,
    node_ids: Arc<[NodeId]>,
) -> Arc<dyn Rdd<Item = (NodeId, Contribution)>> {
    nodes.flat_map(move |node: Node| {
        Box::new(distribute(node, &node_ids).into_iter())
            as Box<dyn Iterator<Item = (NodeId, Contribution)>>
    })
}

/// Groups the contributions by recipient and runs [`collect`] on every group.
/// Any collector failure fails the round. The shuffle behind the grouping is
/// released before returning, whether the round succeeded or not.
pub fn collect_weights(
    contributions: Arc<dyn Rdd<Item = (NodeId, Contribution)>>,
    num_partitions: usize,
) -> Result<Vec<Node>> {
    let context = contributions.get_context();
    let grouped = contributions.group_by_key(num_partitions);
    let per_partition = context.run_job(
        grouped.clone(),
        |iter: Box<dyn Iterator<Item = (NodeId, Vec<Contribution>)>>| {
            iter.map(|(id, contributions)| collect(id, contributions))
                .collect::<Result<Vec<Node>>>()
        },
    );
    context.release_shuffles(grouped.get_rdd_base());
    let per_partition = per_partition?;
    let mut nodes = Vec::new();
    for partition in per_partition {
        nodes.extend(partition?);
    }
    Ok(nodes)
}
