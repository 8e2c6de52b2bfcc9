use std::sync::Arc;

use crate::context::Context;
use crate::dependency::{Dependency, SortShuffleDependency};
use crate::error::Result;
use crate::partitioner::{compare_keys, Partitioner};
use crate::rdd::shuffled_rdd::ShuffledRddSplit;
use crate::rdd::{Rdd, RddBase, RddVals};
use crate::serializable_traits::Data;
use crate::shuffle::ShuffleFetcher;
use crate::split::Split;

/// Result of `sort_by_key`: records are range partitioned by key, each split
/// sorts its own range, so reading the splits in order yields a total order.
pub struct SortedRdd<K: Data + PartialOrd, V: Data> {
    vals: Arc<RddVals>,
    part: Box<dyn Partitioner<K>>,
    shuffle_id: usize,
    ascending: bool,
    _marker_v: std::marker::PhantomData<V>,
}

impl<K: Data + PartialOrd, V: Data> Clone for SortedRdd<K, V> {
    fn clone(&self) -> Self {
        SortedRdd {
            vals: self.vals.clone(),
            part: self.part.clone(),
            shuffle_id: self.shuffle_id,
            ascending: self.ascending,
            _marker_v: std::marker::PhantomData,
        }
    }
}

impl<K: Data + PartialOrd, V: Data> SortedRdd<K, V> {
    pub(crate) fn new(
        parent: Arc<dyn Rdd<Item = (K, V)>>,
        part: Box<dyn Partitioner<K>>,
        ascending: bool,
    ) -> Self {
        let mut vals = RddVals::new(parent.get_context());
        let shuffle_id = vals.context.new_shuffle_id();
        vals.dependencies
            .push(Dependency::ShuffleDependency(Arc::new(
                SortShuffleDependency::new(shuffle_id, parent, part.clone()),
            )));
        SortedRdd {
            vals: Arc::new(vals),
            part,
            shuffle_id,
            ascending,
            _marker_v: std::marker::PhantomData,
        }
    }
}

impl<K: Data + PartialOrd, V: Data> RddBase for SortedRdd<K, V> {
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

impl<K: Data + PartialOrd, V: Data> Rdd for SortedRdd<K, V> {
    type Item = (K, V);
    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        Arc::new(self.clone()) as Arc<dyn RddBase>
    }

    fn get_rdd(&self) -> Arc<dyn Rdd<Item = Self::Item>> {
        Arc::new(self.clone())
    }

    fn compute(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>> {
        let mut records: Vec<(K, V)> = Vec::new();
        ShuffleFetcher::fetch(
            self.vals.context.env(),
            self.shuffle_id,
            split.get_index(),
            |pair: (K, V)| records.push(pair),
        )?;
        // stable, so equal keys keep the order they were fetched in
        if self.ascending {
            records.sort_by(|a, b| compare_keys(&a.0, &b.0));
        } else {
            records.sort_by(|a, b| compare_keys(&b.0, &a.0));
        }
        log::debug!(
            "sorted {} records in split #{} of rdd #{}",
            records.len(),
            split.get_index(),
            self.vals.id
        );
        Ok(Box::new(records.into_iter()))
    }
}
