use std::hash::Hash;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::error::Result;
use crate::partitioner::Partitioner;
use crate::rdd::{Rdd, RddBase};
use crate::serializable_traits::Data;
use rustc_hash::FxHashMap;

// An enum, since downcasting between dependency trait objects is awkward.
#[derive(Clone)]
pub enum Dependency {
    NarrowDependency(Arc<dyn NarrowDependencyTrait>),
    ShuffleDependency(Arc<dyn ShuffleDependencyTrait>),
}

pub trait NarrowDependencyTrait: Send + Sync {
    fn get_parents(&self, partition_id: usize) -> Vec<usize>;
    fn get_rdd_base(&self) -> Arc<dyn RddBase>;
}

#[derive(Clone)]
pub(crate) struct OneToOneDependency {
    rdd_base: Arc<dyn RddBase>,
}

impl OneToOneDependency {
    pub fn new(rdd_base: Arc<dyn RddBase>) -> Self {
        OneToOneDependency { rdd_base }
    }
}

impl NarrowDependencyTrait for OneToOneDependency {
    fn get_parents(&self, partition_id: usize) -> Vec<usize> {
        vec![partition_id]
    }

    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        self.rdd_base.clone()
    }
}

/// The map side of a shuffle: runs over one partition of the parent RDD and
/// writes one bucket per output partition into the context's shuffle store.
pub trait ShuffleDependencyTrait: Send + Sync {
    fn get_shuffle_id(&self) -> usize;
    fn get_rdd_base(&self) -> Arc<dyn RddBase>;
    fn do_shuffle_task(&self, partition: usize) -> Result<()>;
}

/// Shuffle with map-side combining, used by `combine_by_key` and everything built on it.
pub(crate) struct ShuffleDependency<K: Data, V: Data, C: Data> {
    pub shuffle_id: usize,
    pub parent: Arc<dyn Rdd<Item = (K, V)>>,
    pub aggregator: Arc<Aggregator<K, V, C>>,
    pub partitioner: Box<dyn Partitioner<K>>,
}

impl<K: Data, V: Data, C: Data> ShuffleDependency<K, V, C> {
    pub fn new(
        shuffle_id: usize,
        parent: Arc<dyn Rdd<Item = (K, V)>>,
        aggregator: Arc<Aggregator<K, V, C>>,
        partitioner: Box<dyn Partitioner<K>>,
    ) -> Self {
        ShuffleDependency {
            shuffle_id,
            parent,
            aggregator,
            partitioner,
        }
    }
}

impl<K: Data + Eq + Hash, V: Data, C: Data> ShuffleDependencyTrait for ShuffleDependency<K, V, C> {
    fn get_shuffle_id(&self) -> usize {
        self.shuffle_id
    }

    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        self.parent.get_rdd_base()
    }

    fn do_shuffle_task(&self, partition: usize) -> Result<()> {
        log::debug!(
            "executing shuffle task #{} for partition #{}",
            self.shuffle_id,
            partition
        );
        let split = self.parent.get_split(partition)?;
        let num_output_splits = self.partitioner.get_num_of_partitions();
        let mut buckets: Vec<FxHashMap<K, C>> = (0..num_output_splits)
            .map(|_| FxHashMap::default())
            .collect();

        for (k, v) in self.parent.iterator(split)? {
            let bucket = &mut buckets[self.partitioner.get_partition(&k)];
            let combined = match bucket.remove(&k) {
                Some(old_c) => (self.aggregator.merge_value)(old_c, v),
                None => (self.aggregator.create_combiner)(v),
            };
            bucket.insert(k, combined);
        }

        let context = self.parent.get_context();
        let env = context.env();
        for (reduce_id, bucket) in buckets.into_iter().enumerate() {
            let set: Vec<(K, C)> = bucket.into_iter().collect();
            env.shuffle_manager
                .put_bucket(self.shuffle_id, partition, reduce_id, &set)?;
        }
        Ok(())
    }
}

/// Shuffle without combining: records are only routed to their range partition,
/// the reduce side sorts them.
pub(crate) struct SortShuffleDependency<K: Data, V: Data> {
    pub shuffle_id: usize,
    pub parent: Arc<dyn Rdd<Item = (K, V)>>,
    pub partitioner: Box<dyn Partitioner<K>>,
}

impl<K: Data, V: Data> SortShuffleDependency<K, V> {
    pub fn new(
        shuffle_id: usize,
        parent: Arc<dyn Rdd<Item = (K, V)>>,
        partitioner: Box<dyn Partitioner<K>>,
    ) -> Self {
        SortShuffleDependency {
            shuffle_id,
            parent,
            partitioner,
        }
    }
}

impl<K: Data, V: Data> ShuffleDependencyTrait for SortShuffleDependency<K, V> {
    fn get_shuffle_id(&self) -> usize {
        self.shuffle_id
    }

    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        self.parent.get_rdd_base()
    }

    fn do_shuffle_task(&self, partition: usize) -> Result<()> {
        log::debug!(
            "executing sort shuffle task #{} for partition #{}",
            self.shuffle_id,
            partition
        );
        let split = self.parent.get_split(partition)?;
        let mut buckets: Vec<Vec<(K, V)>> = (0..self.partitioner.get_num_of_partitions())
            .map(|_| Vec::new())
            .collect();
        for (k, v) in self.parent.iterator(split)? {
            let bucket_id = self.partitioner.get_partition(&k);
            buckets[bucket_id].push((k, v));
        }

        let context = self.parent.get_context();
        let env = context.env();
        for (reduce_id, bucket) in buckets.iter().enumerate() {
            env.shuffle_manager
                .put_bucket(self.shuffle_id, partition, reduce_id, bucket)?;
        }
        Ok(())
    }
}
