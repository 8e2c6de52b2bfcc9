use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use crate::aggregator::Aggregator;
use crate::context::Context;
use crate::dependency::{Dependency, ShuffleDependency};
use crate::error::Result;
use crate::partitioner::Partitioner;
use crate::rdd::{Rdd, RddBase, RddVals};
use crate::serializable_traits::Data;
use crate::shuffle::ShuffleFetcher;
use crate::split::Split;
use log::debug;
use rustc_hash::FxHashMap;

#[derive(Clone)]
pub(crate) struct ShuffledRddSplit {
    index: usize,
}

impl ShuffledRddSplit {
    pub fn new(index: usize) -> Self {
        ShuffledRddSplit { index }
    }
}

impl Split for ShuffledRddSplit {
    fn get_index(&self) -> usize {
        self.index
    }
}

/// The reduce side of a combining shuffle: every split merges the combiners
/// that all map tasks wrote for it.
pub struct ShuffledRdd<K: Data + Eq + Hash, V: Data, C: Data> {
    aggregator: Arc<Aggregator<K, V, C>>,
    vals: Arc<RddVals>,
    part: Box<dyn Partitioner<K>>,
    shuffle_id: usize,
}

impl<K: Data + Eq + Hash, V: Data, C: Data> Clone for ShuffledRdd<K, V, C> {
    fn clone(&self) -> Self {
        ShuffledRdd {
            aggregator: self.aggregator.clone(),
            vals: self.vals.clone(),
            part: self.part.clone(),
            shuffle_id: self.shuffle_id,
        }
    }
}

impl<K: Data + Eq + Hash, V: Data, C: Data> ShuffledRdd<K, V, C> {
    pub(crate) fn new(
        parent: Arc<dyn Rdd<Item = (K, V)>>,
        aggregator: Arc<Aggregator<K, V, C>>,
        part: Box<dyn Partitioner<K>>,
    ) -> Self {
        let mut vals = RddVals::new(parent.get_context());
        let shuffle_id = vals.context.new_shuffle_id();

        vals.dependencies
            .push(Dependency::ShuffleDependency(Arc::new(
                ShuffleDependency::new(shuffle_id, parent, aggregator.clone(), part.clone()),
            )));
        ShuffledRdd {
            aggregator,
            vals: Arc::new(vals),
            part,
            shuffle_id,
        }
    }
}

impl<K: Data + Eq + Hash, V: Data, C: Data> RddBase for ShuffledRdd<K, V, C> {
    fn get_rdd_id(&self) -> usize {
        self.vals.id
    }

    fn get_context(&self) -> Arc<Context> {
        self.vals.context.clone()
    }

    fn get_dependencies(&self) -> Vec<Dependency> {
        self.vals.dependencies.clone()
    }

    fn splits(&self) -> Vec<Box<dyn Split>> {
        (0..self.part.get_num_of_partitions())
            .map(|x| Box::new(ShuffledRddSplit::new(x)) as Box<dyn Split>)
            .collect()
    }

    fn number_of_splits(&self) -> usize {
        self.part.get_num_of_partitions()
    }
}

impl<K: Data + Eq + Hash, V: Data, C: Data> Rdd for ShuffledRdd<K, V, C> {
    type Item = (K, C);
    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        Arc::new(self.clone()) as Arc<dyn RddBase>
    }

    fn get_rdd(&self) -> Arc<dyn Rdd<Item = Self::Item>> {
        Arc::new(self.clone())
    }

    fn compute(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>> {
        debug!("compute inside shuffled rdd #{}", self.vals.id);
        let mut combiners: FxHashMap<K, C> = FxHashMap::default();
        let merge_combiners = self.aggregator.merge_combiners.clone();
        let merge_pair = |(k, c): (K, C)| {
            let merged = match combiners.remove(&k) {
                Some(old) => merge_combiners(old, c),
                None => c,
            };
            combiners.insert(k, merged);
        };

        let start = Instant::now();
        ShuffleFetcher::fetch(
            self.vals.context.env(),
            self.shuffle_id,
            split.get_index(),
            merge_pair,
        )?;
        debug!(
            "time taken for fetching {} ms",
            start.elapsed().as_millis()
        );
        Ok(Box::new(combiners.into_iter()))
    }
}
