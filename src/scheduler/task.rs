use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::dependency::ShuffleDependencyTrait;
use crate::error::Result;
use crate::rdd::Rdd;
use crate::serializable_traits::{Data, Func};

/// Identifies the task a closure is running in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskContext {
    pub stage_id: usize,
    pub split_id: usize,
    pub attempt_id: usize,
}

impl TaskContext {
    pub fn new(stage_id: usize, split_id: usize, attempt_id: usize) -> Self {
        TaskContext {
            stage_id,
            split_id,
            attempt_id,
        }
    }
}

/// Runs one partition of the parent of a shuffle and stores its buckets.
pub(crate) struct ShuffleMapTask {
    pub task_id: usize,
    pub stage_id: usize,
    pub partition: usize,
    dep: Arc<dyn ShuffleDependencyTrait>,
}

impl Display for ShuffleMapTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ShuffleMapTask #{} (stage {}, partition {})",
            self.task_id, self.stage_id, self.partition
        )
    }
}

impl ShuffleMapTask {
    pub fn new(
        task_id: usize,
        stage_id: usize,
        dep: Arc<dyn ShuffleDependencyTrait>,
        partition: usize,
    ) -> Self {
        ShuffleMapTask {
            task_id,
            stage_id,
            partition,
            dep,
        }
    }

    pub fn run(&self) -> Result<()> {
        self.dep.do_shuffle_task(self.partition)
    }
}

/// Applies the job function to one partition of the final RDD.
pub(crate) struct ResultTask<T: Data, U, F>
where
    F: Func<(TaskContext, Box<dyn Iterator<Item = T>>), U>,
{
    pub task_id: usize,
    pub stage_id: usize,
    pub partition: usize,
    rdd: Arc<dyn Rdd<Item = T>>,
    func: Arc<F>,
    _marker: PhantomData<U>,
}

impl<T: Data, U, F> Display for ResultTask<T, U, F>
where
    F: Func<(TaskContext, Box<dyn Iterator<Item = T>>), U>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ResultTask #{} (stage {}, partition {})",
            self.task_id, self.stage_id, self.partition
        )
    }
}

impl<T: Data, U, F> ResultTask<T, U, F>
where
    F: Func<(TaskContext, Box<dyn Iterator<Item = T>>), U>,
{
    pub fn new(
        task_id: usize,
        stage_id: usize,
        rdd: Arc<dyn Rdd<Item = T>>,
        func: Arc<F>,
        partition: usize,
    ) -> Self {
        ResultTask {
            task_id,
            stage_id,
            partition,
            rdd,
            func,
            _marker: PhantomData,
        }
    }

    pub fn run(&self, attempt_id: usize) -> Result<U> {
        let split = self.rdd.get_split(self.partition)?;
        let context = TaskContext::new(self.stage_id, self.partition, attempt_id);
        Ok((self.func)((context, self.rdd.iterator(split)?)))
    }
}
