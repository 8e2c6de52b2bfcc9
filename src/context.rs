use std::fs;
use std::path::Path;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::env::{Configuration, Env};
use crate::error::Result;
use crate::rdd::parallel_collection_rdd::ParallelCollection;
use crate::rdd::{Rdd, RddBase};
use crate::scheduler::{LocalScheduler, TaskContext};
use crate::serializable_traits::{Data, Func};
use log::LevelFilter;
use once_cell::sync::OnceCell;
use simplelog::*;
use uuid::Uuid;

/// Entry point of the engine: hands out RDD and shuffle ids, owns the shuffle
/// state and runs jobs on the local scheduler.
pub struct Context {
    job_id: String,
    next_rdd_id: AtomicUsize,
    next_shuffle_id: AtomicUsize,
    default_partitions: usize,
    scheduler: LocalScheduler,
    env: Env,
}

impl Context {
    /// Creates a context configured from the `BACKRANK_` environment variables.
    pub fn new() -> Result<Arc<Self>> {
        Context::with_config(Configuration::get()?)
    }

    pub fn with_config(config: &Configuration) -> Result<Arc<Self>> {
        let job_id = Uuid::new_v4().to_string();
        initialize_loggers(config, &job_id)?;
        log::info!(
            "starting job {} with {} worker thread(s)",
            job_id,
            config.num_threads
        );
        Ok(Arc::new(Context {
            job_id,
            next_rdd_id: AtomicUsize::new(0),
            next_shuffle_id: AtomicUsize::new(0),
            default_partitions: config.default_partitions.max(1),
            scheduler: LocalScheduler::new(config.num_threads),
            env: Env::new(),
        }))
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Number of partitions used when the caller does not ask for any.
    pub fn default_parallelism(&self) -> usize {
        self.default_partitions
    }

    pub fn new_rdd_id(&self) -> usize {
        self.next_rdd_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn new_shuffle_id(&self) -> usize {
        self.next_shuffle_id.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    pub fn make_rdd<T: Data, I>(
        self: &Arc<Self>,
        seq: I,
        num_slices: usize,
    ) -> Arc<dyn Rdd<Item = T>>
    where
        I: IntoIterator<Item = T>,
    {
        self.parallelize(seq, num_slices)
    }

    pub fn parallelize<T: Data, I>(self: &Arc<Self>, seq: I, num_slices: usize) -> Arc<dyn Rdd<Item = T>>
    where
        I: IntoIterator<Item = T>,
    {
        Arc::new(ParallelCollection::new(self.clone(), seq, num_slices))
    }

    /// Frees the shuffle output held for the lineage of `rdd`, once the caller
    /// has materialized what it needs from it.
    pub fn release_shuffles(&self, rdd: Arc<dyn RddBase>) {
        self.scheduler.release_shuffles(&self.env, rdd);
    }

    pub fn run_job<T: Data, U: Send + 'static, F>(
        self: &Arc<Self>,
        rdd: Arc<dyn Rdd<Item = T>>,
        func: F,
    ) -> Result<Vec<U>>
    where
        F: Func<Box<dyn Iterator<Item = T>>, U>,
    {
        let partitions: Vec<usize> = (0..rdd.number_of_splits()).collect();
        self.run_job_with_partitions(rdd, func, partitions)
    }

    pub fn run_job_with_partitions<T: Data, U: Send + 'static, F, P>(
        self: &Arc<Self>,
        rdd: Arc<dyn Rdd<Item = T>>,
        func: F,
        partitions: P,
    ) -> Result<Vec<U>>
    where
        F: Func<Box<dyn Iterator<Item = T>>, U>,
        P: IntoIterator<Item = usize>,
    {
        let cl = move |(_task_context, iter): (TaskContext, Box<dyn Iterator<Item = T>>)| {
            (func)(iter)
        };
        self.scheduler.run_job(
            &self.env,
            Arc::new(cl),
            rdd,
            partitions.into_iter().collect(),
        )
    }

    pub fn run_job_with_context<T: Data, U: Send + 'static, F>(
        self: &Arc<Self>,
        rdd: Arc<dyn Rdd<Item = T>>,
        func: F,
    ) -> Result<Vec<U>>
    where
        F: Func<(TaskContext, Box<dyn Iterator<Item = T>>), U>,
    {
        log::debug!("inside run job in context");
        let partitions: Vec<usize> = (0..rdd.number_of_splits()).collect();
        self.scheduler
            .run_job(&self.env, Arc::new(func), rdd, partitions)
    }
}

static LOGGER: OnceCell<()> = OnceCell::new();

fn initialize_loggers(config: &Configuration, job_id: &str) -> Result<()> {
    fn _initializer(log_level: LevelFilter, log_dir: Option<&Path>, job_id: &str) -> Result<()> {
        let term_logger: Box<dyn SharedLogger> = TermLogger::new(
            log_level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        );
        let mut combined = vec![term_logger];
        if let Some(dir) = log_dir {
            fs::create_dir_all(dir)?;
            let file_path = dir.join(format!("backrank-{}.log", job_id));
            let file_logger: Box<dyn SharedLogger> =
                WriteLogger::new(log_level, Config::default(), fs::File::create(&file_path)?);
            combined.push(file_logger);
        }
        if let Err(err) = CombinedLogger::init(combined) {
            // some other logger got installed first, keep using it
            log::debug!("logger already initialized: {}", err);
        }
        if let Some(dir) = log_dir {
            log::info!("path for file logger: {}", dir.display());
        }
        Ok(())
    }

    LOGGER
        .get_or_try_init(|| _initializer(config.log_level.into(), config.log_dir.as_deref(), job_id))
        .map(|_| ())
}
