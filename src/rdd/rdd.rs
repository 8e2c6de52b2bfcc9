use std::sync::Arc;

use crate::context::Context;
use crate::dependency::Dependency;
use crate::error::{Error, Result};
use crate::serializable_traits::{Data, Func};
use crate::split::Split;

use super::{FlatMapperRdd, MapPartitionsRdd, MapperRdd};

// Values which are needed for all RDDs
pub(crate) struct RddVals {
    pub id: usize,
    pub dependencies: Vec<Dependency>,
    pub context: Arc<Context>,
}

impl RddVals {
    pub fn new(sc: Arc<Context>) -> Self {
        RddVals {
            id: sc.new_rdd_id(),
            dependencies: Vec::new(),
            context: sc,
        }
    }
}

// Due to the lack of HKTs in Rust, it is difficult to have collection of generic data with different types.
// Required for storing multiple RDDs inside dependencies and other places like Tasks, etc.,
// Refactored RDD trait into two traits one having RddBase trait which contains only non generic methods which provide information for dependency lists
// Another separate Rdd containing generic methods like map, etc.,
pub trait RddBase: Send + Sync {
    fn get_rdd_id(&self) -> usize;
    fn get_context(&self) -> Arc<Context>;
    fn get_dependencies(&self) -> Vec<Dependency>;
    fn splits(&self) -> Vec<Box<dyn Split>>;
    fn number_of_splits(&self) -> usize {
        self.splits().len()
    }
    fn get_split(&self, index: usize) -> Result<Box<dyn Split>> {
        self.splits()
            .into_iter()
            .nth(index)
            .ok_or(Error::SplitOutOfRange {
                rdd_id: self.get_rdd_id(),
                index,
            })
    }
}

impl<I: Data> RddBase for Arc<dyn Rdd<Item = I>> {
    fn get_rdd_id(&self) -> usize {
        (**self).get_rdd_id()
    }
    fn get_context(&self) -> Arc<Context> {
        (**self).get_context()
    }
    fn get_dependencies(&self) -> Vec<Dependency> {
        (**self).get_dependencies()
    }
    fn splits(&self) -> Vec<Box<dyn Split>> {
        (**self).splits()
    }
    fn number_of_splits(&self) -> usize {
        (**self).number_of_splits()
    }
    fn get_split(&self, index: usize) -> Result<Box<dyn Split>> {
        (**self).get_split(index)
    }
}

impl<I: Data> Rdd for Arc<dyn Rdd<Item = I>> {
    type Item = I;
    fn get_rdd(&self) -> Arc<dyn Rdd<Item = Self::Item>> {
        self.clone()
    }
    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        (**self).get_rdd_base()
    }
    fn compute(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>> {
        (**self).compute(split)
    }
}

// Rdd containing methods associated with processing
pub trait Rdd: RddBase + 'static {
    type Item: Data;
    fn get_rdd(&self) -> Arc<dyn Rdd<Item = Self::Item>>;

    fn get_rdd_base(&self) -> Arc<dyn RddBase>;

    fn compute(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>>;

    fn iterator(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>> {
        self.compute(split)
    }

    /// Return a new RDD by applying a function to all elements of this RDD.
    fn map<U: Data, F>(&self, f: F) -> Arc<dyn Rdd<Item = U>>
    where
        Self: Sized,
        F: Func<Self::Item, U>,
    {
        Arc::new(MapperRdd::new(self.get_rdd(), f))
    }

    /// Return a new RDD by first applying a function to all elements of this
    /// RDD, and then flattening the results.
    fn flat_map<U: Data, F>(&self, f: F) -> Arc<dyn Rdd<Item = U>>
    where
        Self: Sized,
        F: Func<Self::Item, Box<dyn Iterator<Item = U>>>,
    {
        Arc::new(FlatMapperRdd::new(self.get_rdd(), f))
    }

    /// Return a new RDD by applying a function to each partition of this RDD,
    /// the function also receives the index of the partition.
    fn map_partitions<U: Data, F>(&self, func: F) -> Arc<dyn Rdd<Item = U>>
    where
        Self: Sized,
        F: Fn(usize, Box<dyn Iterator<Item = Self::Item>>) -> Box<dyn Iterator<Item = U>>
            + Clone
            + Send
            + Sync
            + 'static,
    {
        Arc::new(MapPartitionsRdd::new(self.get_rdd(), func))
    }

    fn collect(&self) -> Result<Vec<Self::Item>>
    where
        Self: Sized,
    {
        let cl = |iter: Box<dyn Iterator<Item = Self::Item>>| iter.collect::<Vec<Self::Item>>();
        let results = self.get_context().run_job(self.get_rdd(), cl)?;
        let size = results.iter().fold(0, |a, b: &Vec<Self::Item>| a + b.len());
        Ok(results
            .into_iter()
            .fold(Vec::with_capacity(size), |mut acc, v| {
                acc.extend(v);
                acc
            }))
    }

    fn count(&self) -> Result<u64>
    where
        Self: Sized,
    {
        let context = self.get_context();
        let counting_func = |iter: Box<dyn Iterator<Item = Self::Item>>| iter.count() as u64;
        Ok(context
            .run_job(self.get_rdd(), counting_func)?
            .into_iter()
            .sum())
    }

    fn reduce<F>(&self, f: F) -> Result<Option<Self::Item>>
    where
        Self: Sized,
        F: Fn(Self::Item, Self::Item) -> Self::Item + Clone + Send + Sync + 'static,
    {
        // cloned cause we will use `f` later.
        let cf = f.clone();
        let reduce_partition = move |iter: Box<dyn Iterator<Item = Self::Item>>| {
            iter.fold(None, |acc: Option<Self::Item>, e| match acc {
                None => Some(e),
                Some(a) => Some(cf(a, e)),
            })
        };
        let results = self.get_context().run_job(self.get_rdd(), reduce_partition)?;
        Ok(results
            .into_iter()
            .flatten()
            .fold(None, |acc, e| match acc {
                None => Some(e),
                Some(a) => Some(f(a, e)),
            }))
    }

    /// Take the first num elements of the RDD. It works by first scanning one partition, and use the
    /// results from that partition to estimate the number of additional partitions needed to satisfy
    /// the limit.
    ///
    /// This method should only be used if the resulting array is expected to be small, as
    /// all the data is loaded into the driver's memory.
    fn take(&self, num: usize) -> Result<Vec<Self::Item>>
    where
        Self: Sized,
    {
        const SCALE_UP_FACTOR: f64 = 2.0;
        if num == 0 {
            return Ok(vec![]);
        }
        let mut buf = vec![];
        let total_parts = self.number_of_splits() as u32;
        let mut parts_scanned = 0_u32;
        while buf.len() < num && parts_scanned < total_parts {
            // The number of partitions to try in this iteration. It is ok for this number to be
            // greater than total_parts because we actually cap it at total_parts below.
            let mut num_parts_to_try = 1u32;
            let left = num - buf.len();
            if parts_scanned > 0 {
                // If we didn't find any rows after the previous iteration, quadruple and retry.
                // Otherwise, interpolate the number of partitions we need to try, but overestimate
                // it by 50%. We also cap the estimation in the end.
                let parts_scanned = f64::from(parts_scanned);
                num_parts_to_try = if buf.is_empty() {
                    (parts_scanned * SCALE_UP_FACTOR).ceil() as u32
                } else {
                    let num_parts_to_try =
                        (1.5 * left as f64 * parts_scanned / (buf.len() as f64)).ceil();
                    num_parts_to_try.min(parts_scanned * SCALE_UP_FACTOR) as u32
                };
            }

            let partitions: Vec<_> = (parts_scanned as usize
                ..total_parts.min(parts_scanned + num_parts_to_try) as usize)
                .collect();
            let num_partitions = partitions.len() as u32;
            let take_from_partion = move |iter: Box<dyn Iterator<Item = Self::Item>>| {
                iter.take(left).collect::<Vec<Self::Item>>()
            };

            let res = self.get_context().run_job_with_partitions(
                self.get_rdd(),
                take_from_partion,
                partitions,
            )?;

            res.into_iter().for_each(|r| {
                let take = num - buf.len();
                buf.extend(r.into_iter().take(take));
            });

            parts_scanned += num_partitions;
        }

        Ok(buf)
    }
}
