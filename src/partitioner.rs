use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::Result;
use crate::rdd::Rdd;
use crate::serializable_traits::Data;
use crate::utils;
use rustc_hash::FxHasher;

/// Partitioner trait for assigning keys to the output partitions of a shuffle.
pub trait Partitioner<K>: dyn_clone::DynClone + Send + Sync {
    fn get_num_of_partitions(&self) -> usize;
    fn get_partition(&self, key: &K) -> usize;
}
dyn_clone::clone_trait_object!(<K> Partitioner<K>);

fn hash<T: Hash>(t: &T) -> u64 {
    let mut s = FxHasher::default();
    t.hash(&mut s);
    s.finish()
}

#[derive(Debug)]
pub struct HashPartitioner<K: Data + Hash + Eq> {
    partitions: usize,
    _marker: PhantomData<K>,
}

impl<K: Data + Hash + Eq> Clone for HashPartitioner<K> {
    fn clone(&self) -> Self {
        HashPartitioner::new(self.partitions)
    }
}

impl<K: Data + Hash + Eq> HashPartitioner<K> {
    pub fn new(partitions: usize) -> Self {
        HashPartitioner {
            partitions: partitions.max(1),
            _marker: PhantomData,
        }
    }
}

impl<K: Data + Hash + Eq> Partitioner<K> for HashPartitioner<K> {
    fn get_num_of_partitions(&self) -> usize {
        self.partitions
    }

    fn get_partition(&self, key: &K) -> usize {
        (hash(key) % self.partitions as u64) as usize
    }
}

/// Partitions sortable keys into roughly equal ranges, bounds are chosen from a
/// sample of the keys of the RDD being sorted.
pub struct RangePartitioner<K: Data + PartialOrd> {
    ascending: bool,
    range_bounds: Arc<Vec<K>>,
}

impl<K: Data + PartialOrd> Clone for RangePartitioner<K> {
    fn clone(&self) -> Self {
        RangePartitioner {
            ascending: self.ascending,
            range_bounds: self.range_bounds.clone(),
        }
    }
}

pub(crate) fn compare_keys<K: PartialOrd>(a: &K, b: &K) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

impl<K: Data + PartialOrd> RangePartitioner<K> {
    pub fn new(
        partitions: usize,
        keys: Arc<dyn Rdd<Item = K>>,
        ascending: bool,
        sample_point_per_partition_hint: usize,
    ) -> Result<Self> {
        let mut range_bounds = Vec::new();
        if partitions > 1 {
            let sample_size = std::cmp::min(1_000_000, sample_point_per_partition_hint * partitions);
            let splits = keys.number_of_splits().max(1);
            let sample_size_per_partition = (sample_size * 3 + splits - 1) / splits;

            let mut samples = keys
                .map_partitions(move |index: usize, iter: Box<dyn Iterator<Item = K>>| {
                    let sample =
                        utils::random::reservoir_sample(iter, sample_size_per_partition, index as u64);
                    Box::new(sample.into_iter()) as Box<dyn Iterator<Item = K>>
                })
                .collect()?;
            samples.sort_by(compare_keys);

            if !samples.is_empty() {
                let step = samples.len() as f64 / partitions as f64;
                for idx in 1..partitions {
                    let candidate = &samples[std::cmp::min((idx as f64 * step) as usize, samples.len() - 1)];
                    let is_new_bound = range_bounds
                        .last()
                        .map_or(true, |last| compare_keys(candidate, last) == Ordering::Greater);
                    if is_new_bound {
                        range_bounds.push(candidate.clone());
                    }
                }
            }
        }
        log::debug!(
            "range partitioner with {} bounds, ascending: {}",
            range_bounds.len(),
            ascending
        );

        Ok(RangePartitioner {
            ascending,
            range_bounds: Arc::new(range_bounds),
        })
    }
}

impl<K: Data + PartialOrd> Partitioner<K> for RangePartitioner<K> {
    fn get_num_of_partitions(&self) -> usize {
        self.range_bounds.len() + 1
    }

    fn get_partition(&self, key: &K) -> usize {
        let idx = self
            .range_bounds
            .iter()
            .position(|bound| compare_keys(key, bound) != Ordering::Greater)
            .unwrap_or_else(|| self.range_bounds.len());
        if self.ascending {
            idx
        } else {
            self.range_bounds.len() - idx
        }
    }
}
