use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::pagerank::edges::Edge;
use crate::pagerank::node::{Node, NodeId, Targets};
use crate::pagerank::output::format_output;
use crate::pagerank::weights::{collect_weights, distribute_weights, initialize_nodes};
use crate::rdd::Rdd;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Initialized,
    /// Number of rounds completed so far.
    Iterating(usize),
    Done,
}

/// Drives the distribute and collect rounds over a graph.
///
/// The node collection is materialized at the end of every round, so round
/// `k + 1` only starts once every node of round `k` was collected.
pub struct PageRank {
    context: Arc<Context>,
    num_partitions: usize,
    node_ids: Arc<[NodeId]>,
    nodes: Arc<dyn Rdd<Item = Node>>,
    state: EngineState,
    rounds: usize,
}

impl PageRank {
    pub fn new(context: &Arc<Context>, edges: Vec<Edge>) -> Result<Self> {
        PageRank::with_partitions(context, edges, context.default_parallelism())
    }

    pub fn with_partitions(
        context: &Arc<Context>,
        edges: Vec<Edge>,
        num_partitions: usize,
    ) -> Result<Self> {
        let num_partitions = num_partitions.max(1);
        let start = Instant::now();
        let initial = initialize_nodes(context, edges, num_partitions);
        let nodes = initial.collect();
        context.release_shuffles(initial.get_rdd_base());
        let mut nodes = nodes?;
        nodes.sort_by_key(|node| node.id);
        let node_ids: Arc<[NodeId]> = nodes.iter().map(|node| node.id).collect();
        log::info!(
            "initialized {} node(s) in {} ms",
            node_ids.len(),
            start.elapsed().as_millis()
        );
        Ok(PageRank {
            context: context.clone(),
            num_partitions,
            node_ids,
            nodes: context.parallelize(nodes, num_partitions),
            state: EngineState::Initialized,
            rounds: 0,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.node_ids.len()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// The current node collection, for further processing.
    pub fn node_rdd(&self) -> Arc<dyn Rdd<Item = Node>> {
        self.nodes.clone()
    }

    /// Runs one round and returns the largest weight change of any node.
    pub fn iterate(&mut self) -> Result<f64> {
        if self.state == EngineState::Done {
            return Err(Error::EngineDone);
        }
        let start = Instant::now();
        // nothing to give to anyone, weights stay put
        if self.num_nodes() <= 1 {
            self.finish_round(start, 0.0);
            return Ok(0.0);
        }

        let contributions = distribute_weights(&self.nodes, self.node_ids.clone());
        let mut next = collect_weights(contributions, self.num_partitions)?;
        next.sort_by_key(|node| node.id);
        let max_change = next.iter().map(Node::change).fold(0.0, f64::max);
        self.nodes = self.context.parallelize(next, self.num_partitions);
        self.finish_round(start, max_change);
        Ok(max_change)
    }

    fn finish_round(&mut self, start: Instant, max_change: f64) {
        self.rounds += 1;
        self.state = EngineState::Iterating(self.rounds);
        log::info!(
            "round {} done in {} ms, max weight change {:e}",
            self.rounds,
            start.elapsed().as_millis(),
            max_change
        );
    }

    /// Runs exactly `iterations` rounds.
    pub fn run(&mut self, iterations: usize) -> Result<()> {
        for _ in 0..iterations {
            self.iterate()?;
        }
        self.state = EngineState::Done;
        Ok(())
    }

    /// Runs at most `max_iterations` rounds, stopping after the first round in
    /// which no weight moved by `tolerance` or more. Returns the rounds run.
    pub fn run_until(&mut self, max_iterations: usize, tolerance: f64) -> Result<usize> {
        let mut ran = 0;
        while ran < max_iterations {
            let max_change = self.iterate()?;
            ran += 1;
            if max_change < tolerance {
                log::info!("converged after {} round(s)", ran);
                break;
            }
        }
        self.state = EngineState::Done;
        Ok(ran)
    }

    pub fn nodes(&self) -> Result<Vec<Node>> {
        self.nodes.collect()
    }

    /// Outgoing targets of every node.
    pub fn topology(&self) -> Result<BTreeMap<NodeId, Targets>> {
        Ok(self
            .nodes()?
            .into_iter()
            .map(|node| (node.id, node.targets))
            .collect())
    }

    /// All nodes as `(id, weight)`, heaviest first.
    pub fn ranking(&self) -> Result<Vec<(NodeId, f64)>> {
        let sorted = format_output(self.nodes.clone(), self.num_partitions)?;
        let ranking = sorted.collect();
        self.context.release_shuffles(sorted.get_rdd_base());
        ranking
    }

    /// The `k` heaviest nodes as `(id, weight)`.
    pub fn top(&self, k: usize) -> Result<Vec<(NodeId, f64)>> {
        let sorted = format_output(self.nodes.clone(), self.num_partitions)?;
        let top = sorted.take(k);
        self.context.release_shuffles(sorted.get_rdd_base());
        top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagerank::edges::parse_edges;

    fn stored_shuffle_state(context: &Context) -> (usize, usize) {
        let env = context.env();
        (
            env.shuffle_manager.num_buckets(),
            env.map_output_tracker.num_registered(),
        )
    }

    #[test]
    fn shuffle_state_does_not_outlive_a_round() -> Result<()> {
        // a private context, other tests share theirs
        let context = Context::with_config(&crate::env::Configuration::default())?;
        let mut pr = PageRank::with_partitions(&context, parse_edges("0 1\n1 2\n2 0\n")?, 2)?;
        assert_eq!(stored_shuffle_state(&context), (0, 0));

        for _ in 0..5 {
            pr.iterate()?;
            assert_eq!(stored_shuffle_state(&context), (0, 0));
        }

        assert_eq!(pr.ranking()?.len(), 3);
        assert_eq!(pr.top(2)?.len(), 2);
        assert_eq!(stored_shuffle_state(&context), (0, 0));
        Ok(())
    }

    #[test]
    fn released_lineage_can_still_be_recomputed() -> Result<()> {
        let context = Context::with_config(&crate::env::Configuration::default())?;
        let pr = PageRank::with_partitions(&context, parse_edges("0 1\n1 2\n")?, 2)?;
        let sorted = format_output(pr.node_rdd(), 2)?;
        let first = sorted.collect()?;
        context.release_shuffles(sorted.get_rdd_base());
        assert_eq!(stored_shuffle_state(&context), (0, 0));
        assert_eq!(sorted.collect()?, first);
        Ok(())
    }
}
