use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::context::Context;
use crate::dependency::{Dependency, OneToOneDependency};
use crate::error::Result;
use crate::partitioner::{HashPartitioner, Partitioner, RangePartitioner};
use crate::rdd::{shuffled_rdd::ShuffledRdd, sorted_rdd::SortedRdd, Rdd, RddBase, RddVals};
use crate::serializable_traits::{Data, Func};
use crate::split::Split;

// Sample points taken per output partition when picking range bounds.
const SORT_SAMPLE_HINT: usize = 20;

// Trait containing pair rdd methods. No need of implicit conversion like in Spark version
pub trait PairRdd<K: Data, V: Data>: Rdd<Item = (K, V)> + Send + Sync {
    fn combine_by_key<C: Data>(
        &self,
        aggregator: Aggregator<K, V, C>,
        partitioner: Box<dyn Partitioner<K>>,
    ) -> Arc<dyn Rdd<Item = (K, C)>>
    where
        Self: Sized,
        K: Eq + Hash,
    {
        Arc::new(ShuffledRdd::new(
            self.get_rdd(),
            Arc::new(aggregator),
            partitioner,
        ))
    }

    fn group_by_key(&self, num_splits: usize) -> Arc<dyn Rdd<Item = (K, Vec<V>)>>
    where
        Self: Sized,
        K: Eq + Hash,
    {
        self.group_by_key_using_partitioner(
            Box::new(HashPartitioner::<K>::new(num_splits)) as Box<dyn Partitioner<K>>
        )
    }

    fn group_by_key_using_partitioner(
        &self,
        partitioner: Box<dyn Partitioner<K>>,
    ) -> Arc<dyn Rdd<Item = (K, Vec<V>)>>
    where
        Self: Sized,
        K: Eq + Hash,
    {
        self.combine_by_key(Aggregator::<K, V, _>::default(), partitioner)
    }

    fn reduce_by_key<F>(&self, func: F, num_splits: usize) -> Arc<dyn Rdd<Item = (K, V)>>
    where
        F: Fn(V, V) -> V + Clone + Send + Sync + 'static,
        Self: Sized,
        K: Eq + Hash,
    {
        self.reduce_by_key_using_partitioner(
            func,
            Box::new(HashPartitioner::<K>::new(num_splits)) as Box<dyn Partitioner<K>>,
        )
    }

    fn reduce_by_key_using_partitioner<F>(
        &self,
        func: F,
        partitioner: Box<dyn Partitioner<K>>,
    ) -> Arc<dyn Rdd<Item = (K, V)>>
    where
        F: Fn(V, V) -> V + Clone + Send + Sync + 'static,
        Self: Sized,
        K: Eq + Hash,
    {
        let create_combiner = Arc::new(|v: V| v);
        let f_clone = func.clone();
        let merge_value = Arc::new(move |buf: V, v: V| (f_clone)(buf, v));
        let merge_combiners = Arc::new(move |b1: V, b2: V| (func)(b1, b2));
        let aggregator = Aggregator::new(create_combiner, merge_value, merge_combiners);
        self.combine_by_key(aggregator, partitioner)
    }

    fn map_values<U: Data, F>(&self, f: F) -> Arc<dyn Rdd<Item = (K, U)>>
    where
        F: Func<V, U>,
        Self: Sized,
    {
        Arc::new(MappedValuesRdd::new(self.get_rdd(), f))
    }

    /// Sort the RDD by key into `num_partitions` ranges. Collecting the result
    /// yields the records ordered by key; records with equal keys keep no
    /// particular order.
    fn sort_by_key(
        &self,
        ascending: bool,
        num_partitions: usize,
    ) -> Result<Arc<dyn Rdd<Item = (K, V)>>>
    where
        Self: Sized,
        K: PartialOrd,
    {
        let keys = self.map(|(k, _): (K, V)| k);
        let partitioner =
            RangePartitioner::new(num_partitions, keys, ascending, SORT_SAMPLE_HINT)?;
        Ok(Arc::new(SortedRdd::new(
            self.get_rdd(),
            Box::new(partitioner),
            ascending,
        )))
    }
}

// Implementing the PairRdd trait for all types which implements Rdd
impl<K: Data, V: Data, T> PairRdd<K, V> for T where T: Rdd<Item = (K, V)> {}

pub struct MappedValuesRdd<K: Data, V: Data, U: Data, F>
where
    F: Func<V, U>,
{
    prev: Arc<dyn Rdd<Item = (K, V)>>,
    vals: Arc<RddVals>,
    f: F,
    _marker_t: PhantomData<U>,
}

impl<K: Data, V: Data, U: Data, F> Clone for MappedValuesRdd<K, V, U, F>
where
    F: Func<V, U>,
{
    fn clone(&self) -> Self {
        MappedValuesRdd {
            prev: self.prev.clone(),
            vals: self.vals.clone(),
            f: self.f.clone(),
            _marker_t: PhantomData,
        }
    }
}

impl<K: Data, V: Data, U: Data, F> MappedValuesRdd<K, V, U, F>
where
    F: Func<V, U>,
{
    fn new(prev: Arc<dyn Rdd<Item = (K, V)>>, f: F) -> Self {
        let mut vals = RddVals::new(prev.get_context());
        vals.dependencies
            .push(Dependency::NarrowDependency(Arc::new(
                OneToOneDependency::new(prev.get_rdd_base()),
            )));
        MappedValuesRdd {
            prev,
            vals: Arc::new(vals),
            f,
            _marker_t: PhantomData,
        }
    }
}

impl<K: Data, V: Data, U: Data, F> RddBase for MappedValuesRdd<K, V, U, F>
where
    F: Func<V, U>,
{
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
        self.prev.splits()
    }

    fn number_of_splits(&self) -> usize {
        self.prev.number_of_splits()
    }

    fn get_split(&self, index: usize) -> Result<Box<dyn Split>> {
        self.prev.get_split(index)
    }
}

impl<K: Data, V: Data, U: Data, F> Rdd for MappedValuesRdd<K, V, U, F>
where
    F: Func<V, U>,
{
    type Item = (K, U);
    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        Arc::new(self.clone()) as Arc<dyn RddBase>
    }

    fn get_rdd(&self) -> Arc<dyn Rdd<Item = Self::Item>> {
        Arc::new(self.clone())
    }

    fn compute(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>> {
        let f = self.f.clone();
        Ok(Box::new(
            self.prev.iterator(split)?.map(move |(k, v)| (k, f(v))),
        ))
    }
}
