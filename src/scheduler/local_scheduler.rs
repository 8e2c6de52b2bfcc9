use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::dependency::{Dependency, ShuffleDependencyTrait};
use crate::env::Env;
use crate::error::{Error, Result};
use crate::rdd::{Rdd, RddBase};
use crate::scheduler::{ResultTask, ShuffleMapTask, Stage, TaskContext};
use crate::serializable_traits::{Data, Func};
use crate::utils;
use parking_lot::Mutex;
use threadpool::ThreadPool;

/// Runs jobs on a local thread pool, one stage at a time.
///
/// Before the final stage of a job runs, every shuffle in its lineage whose
/// map outputs are not registered yet gets a shuffle map stage, parents first.
pub(crate) struct LocalScheduler {
    pool: Mutex<ThreadPool>,
    attempt_id: AtomicUsize,
    next_task_id: AtomicUsize,
    next_stage_id: AtomicUsize,
    scheduler_lock: Mutex<()>,
}

impl LocalScheduler {
    pub fn new(num_threads: usize) -> Self {
        LocalScheduler {
            pool: Mutex::new(ThreadPool::with_name(
                "backrank-worker".to_owned(),
                num_threads.max(1),
            )),
            attempt_id: AtomicUsize::new(0),
            next_task_id: AtomicUsize::new(0),
            next_stage_id: AtomicUsize::new(0),
            scheduler_lock: Mutex::new(()),
        }
    }

    fn get_next_stage_id(&self) -> usize {
        self.next_stage_id.fetch_add(1, Ordering::SeqCst)
    }

    fn get_next_task_id(&self) -> usize {
        self.next_task_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn run_job<T: Data, U: Send + 'static, F>(
        &self,
        env: &Env,
        func: Arc<F>,
        final_rdd: Arc<dyn Rdd<Item = T>>,
        partitions: Vec<usize>,
    ) -> Result<Vec<U>>
    where
        F: Func<(TaskContext, Box<dyn Iterator<Item = T>>), U>,
    {
        // only one job at a time, the stage graph of a job assumes no other job
        // is registering map outputs meanwhile
        let _lock = self.scheduler_lock.lock();
        let start = Instant::now();

        let missing = self.get_missing_shuffles(env, final_rdd.get_rdd_base());
        log::debug!(
            "job on rdd #{} needs {} shuffle map stage(s)",
            final_rdd.get_rdd_id(),
            missing.len()
        );

        if missing.is_empty() && partitions.len() == 1 {
            let stage_id = self.get_next_stage_id();
            let results = self.local_execution(stage_id, func, final_rdd, partitions[0])?;
            log::debug!("local job finished in {} ms", start.elapsed().as_millis());
            return Ok(results);
        }

        for dep in missing {
            let stage = Stage::new(
                self.get_next_stage_id(),
                dep.get_rdd_base().number_of_splits(),
                Some(dep),
            );
            self.run_shuffle_map_stage(env, &stage)?;
        }

        let final_stage = Stage::new(self.get_next_stage_id(), partitions.len(), None);
        log::debug!("submitting final {}", final_stage);
        let tasks = partitions
            .into_iter()
            .map(|partition| {
                let task = ResultTask::new(
                    self.get_next_task_id(),
                    final_stage.id,
                    final_rdd.clone(),
                    func.clone(),
                    partition,
                );
                let attempt_id = self.attempt_id.fetch_add(1, Ordering::SeqCst);
                (partition, move || task.run(attempt_id))
            })
            .collect();
        let results = self.run_tasks(final_stage.id, tasks)?;
        log::debug!("job finished in {} ms", start.elapsed().as_millis());
        Ok(results)
    }

    fn local_execution<T: Data, U: Send + 'static, F>(
        &self,
        stage_id: usize,
        func: Arc<F>,
        final_rdd: Arc<dyn Rdd<Item = T>>,
        partition: usize,
    ) -> Result<Vec<U>>
    where
        F: Func<(TaskContext, Box<dyn Iterator<Item = T>>), U>,
    {
        let task = ResultTask::new(
            self.get_next_task_id(),
            stage_id,
            final_rdd,
            func,
            partition,
        );
        log::debug!("running {} on the calling thread", task);
        let attempt_id = self.attempt_id.fetch_add(1, Ordering::SeqCst);
        let result = panic::catch_unwind(AssertUnwindSafe(|| task.run(attempt_id)))
            .unwrap_or_else(|payload| {
                Err(Error::TaskFailed {
                    stage_id,
                    partition,
                    reason: utils::panic_message(payload),
                })
            })?;
        Ok(vec![result])
    }

    fn run_shuffle_map_stage(&self, env: &Env, stage: &Stage) -> Result<()> {
        let dep = match &stage.shuffle_dependency {
            Some(dep) => dep.clone(),
            None => return Ok(()),
        };
        log::info!(
            "running shuffle map {} for shuffle #{} with {} task(s)",
            stage,
            dep.get_shuffle_id(),
            stage.num_partitions
        );
        let tasks = (0..stage.num_partitions)
            .map(|partition| {
                let task =
                    ShuffleMapTask::new(self.get_next_task_id(), stage.id, dep.clone(), partition);
                (partition, move || {
                    log::debug!("running {}", task);
                    task.run()
                })
            })
            .collect();
        self.run_tasks(stage.id, tasks)?;
        env.map_output_tracker
            .register_map_outputs(dep.get_shuffle_id(), stage.num_partitions);
        Ok(())
    }

    /// Runs every task on the pool and waits for all of them. Results come
    /// back in the order of `tasks`.
    fn run_tasks<R, G>(&self, stage_id: usize, tasks: Vec<(usize, G)>) -> Result<Vec<R>>
    where
        R: Send + 'static,
        G: FnOnce() -> Result<R> + Send + 'static,
    {
        let num_tasks = tasks.len();
        let (sender, receiver) = crossbeam::channel::unbounded();
        {
            let pool = self.pool.lock();
            for (output_id, (partition, task)) in tasks.into_iter().enumerate() {
                let sender = sender.clone();
                pool.execute(move || {
                    let result = panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(
                        |payload| {
                            Err(Error::TaskFailed {
                                stage_id,
                                partition,
                                reason: utils::panic_message(payload),
                            })
                        },
                    );
                    // the receiver only goes away once the job gave up
                    let _ = sender.send((output_id, result));
                });
            }
        }
        drop(sender);

        let mut results: Vec<Option<R>> = (0..num_tasks).map(|_| None).collect();
        let mut first_error = None;
        for _ in 0..num_tasks {
            let (output_id, result) = receiver.recv().map_err(|_| Error::ThreadPool)?;
            match result {
                Ok(value) => results[output_id] = Some(value),
                Err(err) => {
                    log::error!("task #{} of stage #{} failed: {}", output_id, stage_id, err);
                    first_error.get_or_insert(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        results
            .into_iter()
            .map(|r| r.ok_or(Error::ThreadPool))
            .collect()
    }

    /// Drops the stored buckets and map output registrations of every shuffle
    /// in the lineage of `rdd`. A later job over that lineage recomputes them.
    pub fn release_shuffles(&self, env: &Env, rdd: Arc<dyn RddBase>) {
        let _lock = self.scheduler_lock.lock();
        let mut visited = HashSet::new();
        let mut shuffle_ids = Vec::new();
        Self::visit_for_shuffles(rdd, &mut visited, &mut shuffle_ids);
        for shuffle_id in shuffle_ids {
            env.map_output_tracker.unregister(shuffle_id);
            let removed = env.shuffle_manager.remove_shuffle(shuffle_id);
            log::debug!(
                "released shuffle #{} ({} bucket(s)), {} bucket(s) still stored",
                shuffle_id,
                removed,
                env.shuffle_manager.num_buckets()
            );
        }
    }

    fn visit_for_shuffles(
        rdd: Arc<dyn RddBase>,
        visited: &mut HashSet<usize>,
        shuffle_ids: &mut Vec<usize>,
    ) {
        if !visited.insert(rdd.get_rdd_id()) {
            return;
        }
        for dep in rdd.get_dependencies() {
            match dep {
                Dependency::ShuffleDependency(shuf_dep) => {
                    shuffle_ids.push(shuf_dep.get_shuffle_id());
                    Self::visit_for_shuffles(shuf_dep.get_rdd_base(), visited, shuffle_ids);
                }
                Dependency::NarrowDependency(nar_dep) => {
                    Self::visit_for_shuffles(nar_dep.get_rdd_base(), visited, shuffle_ids);
                }
            }
        }
    }

    /// Shuffles reachable from `rdd` whose map outputs are missing, ordered so
    /// that a shuffle comes after every shuffle it reads from.
    fn get_missing_shuffles(
        &self,
        env: &Env,
        rdd: Arc<dyn RddBase>,
    ) -> Vec<Arc<dyn ShuffleDependencyTrait>> {
        let mut visited = HashSet::new();
        let mut missing = Vec::new();
        Self::visit_for_missing_shuffles(env, rdd, &mut visited, &mut missing);
        missing
    }

    fn visit_for_missing_shuffles(
        env: &Env,
        rdd: Arc<dyn RddBase>,
        visited: &mut HashSet<usize>,
        missing: &mut Vec<Arc<dyn ShuffleDependencyTrait>>,
    ) {
        if !visited.insert(rdd.get_rdd_id()) {
            return;
        }
        for dep in rdd.get_dependencies() {
            match dep {
                Dependency::ShuffleDependency(shuf_dep) => {
                    let shuffle_id = shuf_dep.get_shuffle_id();
                    if env.map_output_tracker.is_available(shuffle_id)
                        || missing.iter().any(|d| d.get_shuffle_id() == shuffle_id)
                    {
                        continue;
                    }
                    Self::visit_for_missing_shuffles(
                        env,
                        shuf_dep.get_rdd_base(),
                        visited,
                        missing,
                    );
                    missing.push(shuf_dep);
                }
                Dependency::NarrowDependency(nar_dep) => {
                    Self::visit_for_missing_shuffles(env, nar_dep.get_rdd_base(), visited, missing);
                }
            }
        }
    }
}
