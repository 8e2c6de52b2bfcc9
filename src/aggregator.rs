use std::marker::PhantomData;
use std::sync::Arc;

use crate::serializable_traits::Data;

type CreateCombiner<V, C> = Arc<dyn Fn(V) -> C + Send + Sync>;
type MergeValue<V, C> = Arc<dyn Fn(C, V) -> C + Send + Sync>;
type MergeCombiners<C> = Arc<dyn Fn(C, C) -> C + Send + Sync>;

/// Aggregator for shuffle tasks.
///
/// `merge_value` folds values into a combiner on the map side of the shuffle,
/// `merge_combiners` merges the per map task combiners on the reduce side.
pub struct Aggregator<K: Data, V: Data, C: Data> {
    pub create_combiner: CreateCombiner<V, C>,
    pub merge_value: MergeValue<V, C>,
    pub merge_combiners: MergeCombiners<C>,
    _marker: PhantomData<K>,
}

impl<K: Data, V: Data, C: Data> Aggregator<K, V, C> {
    pub fn new(
        create_combiner: CreateCombiner<V, C>,
        merge_value: MergeValue<V, C>,
        merge_combiners: MergeCombiners<C>,
    ) -> Self {
        Aggregator {
            create_combiner,
            merge_value,
            merge_combiners,
            _marker: PhantomData,
        }
    }
}

impl<K: Data, V: Data, C: Data> Clone for Aggregator<K, V, C> {
    fn clone(&self) -> Self {
        Aggregator {
            create_combiner: self.create_combiner.clone(),
            merge_value: self.merge_value.clone(),
            merge_combiners: self.merge_combiners.clone(),
            _marker: PhantomData,
        }
    }
}

// Grouping aggregator used by group_by_key.
impl<K: Data, V: Data> Default for Aggregator<K, V, Vec<V>> {
    fn default() -> Self {
        let create_combiner = Arc::new(|v: V| vec![v]);
        let merge_value = Arc::new(|mut buf: Vec<V>, v: V| {
            buf.push(v);
            buf
        });
        let merge_combiners = Arc::new(|mut b1: Vec<V>, mut b2: Vec<V>| {
            b1.append(&mut b2);
            b1
        });
        Aggregator::new(create_combiner, merge_value, merge_combiners)
    }
}
