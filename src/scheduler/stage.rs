use std::fmt::Display;
use std::sync::Arc;

use crate::dependency::ShuffleDependencyTrait;

/// A set of tasks that can run in parallel. Shuffle map stages write the
/// buckets of one shuffle, the final stage of a job has no shuffle dependency.
#[derive(Clone)]
pub(crate) struct Stage {
    pub id: usize,
    pub num_partitions: usize,
    pub shuffle_dependency: Option<Arc<dyn ShuffleDependencyTrait>>,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Stage {}", self.id)
    }
}

impl Stage {
    pub fn new(
        id: usize,
        num_partitions: usize,
        shuffle_dependency: Option<Arc<dyn ShuffleDependencyTrait>>,
    ) -> Self {
        Stage {
            id,
            num_partitions,
            shuffle_dependency,
        }
    }
}
