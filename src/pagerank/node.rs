use std::collections::BTreeSet;

use serde_derive::{Deserialize, Serialize};

pub type NodeId = u64;
pub type Targets = BTreeSet<NodeId>;

/// Share of a node's weight that leaves along its outgoing links.
pub const DAMPING_FACTOR: f64 = 0.85;
/// Share of the current weight a node keeps for itself.
pub const CURRENT_RETENTION: f64 = 0.05;
/// Share of the previous round's weight a node gets back through the back edge.
pub const PREVIOUS_RETENTION: f64 = 0.1;
pub const INITIAL_WEIGHT: f64 = 1.0;

/// One vertex of the ranked graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub old_weight: f64,
    pub weight: f64,
    pub targets: Targets,
}

impl Node {
    pub fn new(id: NodeId, targets: Targets) -> Self {
        Node {
            id,
            old_weight: INITIAL_WEIGHT,
            weight: INITIAL_WEIGHT,
            targets,
        }
    }

    pub fn is_dangling(&self) -> bool {
        self.targets.is_empty()
    }

    /// How far the weight moved in the round that produced this node.
    pub fn change(&self) -> f64 {
        (self.weight - self.old_weight).abs()
    }
}

/// A share of weight addressed to one node during the distribute phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Contribution {
    /// What a node sends to itself: its current weight, to become the next
    /// `old_weight`, the retention term and its outgoing links.
    Retained {
        old_weight: f64,
        decay: f64,
        targets: Targets,
    },
    /// Weight arriving over a link or from a dangling node.
    Incoming(f64),
}

impl Contribution {
    pub fn old_contrib(&self) -> f64 {
        match self {
            Contribution::Retained { old_weight, .. } => *old_weight,
            Contribution::Incoming(_) => 0.0,
        }
    }

    pub fn weight_contrib(&self) -> f64 {
        match self {
            Contribution::Retained { decay, .. } => *decay,
            Contribution::Incoming(amount) => *amount,
        }
    }

    pub fn targets_carry(&self) -> Option<&Targets> {
        match self {
            Contribution::Retained { targets, .. } => Some(targets),
            Contribution::Incoming(_) => None,
        }
    }
}
