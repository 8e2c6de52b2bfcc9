//! This module implements parallel collection RDD for dividing the input collection for parallel processing.
use std::sync::Arc;

use crate::context::Context;
use crate::dependency::Dependency;
use crate::error::{Error, Result};
use crate::rdd::{Rdd, RddBase, RddVals};
use crate::serializable_traits::Data;
use crate::split::Split;

#[derive(Clone)]
pub struct ParallelCollectionSplit<T> {
    rdd_id: usize,
    index: usize,
    values: Arc<Vec<T>>,
}

impl<T: Data> Split for ParallelCollectionSplit<T> {
    fn get_index(&self) -> usize {
        self.index
    }
}

impl<T: Data> ParallelCollectionSplit<T> {
    fn new(rdd_id: usize, index: usize, values: Arc<Vec<T>>) -> Self {
        ParallelCollectionSplit {
            rdd_id,
            index,
            values,
        }
    }

    fn iterator(&self) -> Box<dyn Iterator<Item = T>> {
        let data = self.values.clone();
        let len = data.len();
        Box::new((0..len).map(move |i| data[i].clone()))
    }
}

struct ParallelCollectionVals<T> {
    vals: RddVals,
    splits_: Vec<Arc<Vec<T>>>,
}

/// An RDD over an in-memory collection, cut into contiguous slices.
pub struct ParallelCollection<T> {
    rdd_vals: Arc<ParallelCollectionVals<T>>,
}

impl<T: Data> Clone for ParallelCollection<T> {
    fn clone(&self) -> Self {
        ParallelCollection {
            rdd_vals: self.rdd_vals.clone(),
        }
    }
}

impl<T: Data> ParallelCollection<T> {
    pub fn new<I>(context: Arc<Context>, data: I, num_slices: usize) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        ParallelCollection {
            rdd_vals: Arc::new(ParallelCollectionVals {
                vals: RddVals::new(context),
                splits_: ParallelCollection::slice(data, num_slices),
            }),
        }
    }

    // Slice i holds elements [i * len / n, (i + 1) * len / n).
    fn slice<I>(data: I, num_slices: usize) -> Vec<Arc<Vec<T>>>
    where
        I: IntoIterator<Item = T>,
    {
        let num_slices = num_slices.max(1);
        let mut data: Vec<T> = data.into_iter().collect();
        let data_len = data.len();
        let mut output = Vec::with_capacity(num_slices);
        for slice_count in (0..num_slices).rev() {
            let start = (slice_count * data_len) / num_slices;
            output.push(Arc::new(data.split_off(start)));
        }
        output.reverse();
        output
    }
}

impl<T: Data> RddBase for ParallelCollection<T> {
    fn get_rdd_id(&self) -> usize {
        self.rdd_vals.vals.id
    }

    fn get_context(&self) -> Arc<Context> {
        self.rdd_vals.vals.context.clone()
    }

    fn get_dependencies(&self) -> Vec<Dependency> {
        self.rdd_vals.vals.dependencies.clone()
    }

    fn splits(&self) -> Vec<Box<dyn Split>> {
        (0..self.rdd_vals.splits_.len())
            .map(|i| {
                Box::new(ParallelCollectionSplit::new(
                    self.rdd_vals.vals.id,
                    i,
                    self.rdd_vals.splits_[i].clone(),
                )) as Box<dyn Split>
            })
            .collect::<Vec<Box<dyn Split>>>()
    }

    fn number_of_splits(&self) -> usize {
        self.rdd_vals.splits_.len()
    }

    fn get_split(&self, index: usize) -> Result<Box<dyn Split>> {
        self.rdd_vals
            .splits_
            .get(index)
            .map(|values| {
                Box::new(ParallelCollectionSplit::new(
                    self.rdd_vals.vals.id,
                    index,
                    values.clone(),
                )) as Box<dyn Split>
            })
            .ok_or(Error::SplitOutOfRange {
                rdd_id: self.rdd_vals.vals.id,
                index,
            })
    }
}

impl<T: Data> Rdd for ParallelCollection<T> {
    type Item = T;
    fn get_rdd(&self) -> Arc<dyn Rdd<Item = Self::Item>> {
        Arc::new(self.clone())
    }

    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        Arc::new(self.clone()) as Arc<dyn RddBase>
    }

    fn compute(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>> {
        match split.downcast_ref::<ParallelCollectionSplit<T>>() {
            Some(s) if s.rdd_id == self.rdd_vals.vals.id => Ok(s.iterator()),
            _ => Err(Error::DowncastSplit("ParallelCollectionSplit")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_are_contiguous_and_balanced() {
        let slices = ParallelCollection::slice(0..10, 3);
        let lens: Vec<usize> = slices.iter().map(|s| s.len()).collect();
        assert_eq!(lens, vec![3, 3, 4]);
        let flat: Vec<i32> = slices.iter().flat_map(|s| s.iter().copied()).collect();
        assert_eq!(flat, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn more_slices_than_elements() {
        let slices = ParallelCollection::slice(vec![1u8, 2], 4);
        assert_eq!(slices.len(), 4);
        assert_eq!(slices.iter().map(|s| s.len()).sum::<usize>(), 2);
    }

    #[test]
    fn zero_slices_is_clamped() {
        let slices = ParallelCollection::slice(vec![1u8, 2, 3], 0);
        assert_eq!(slices.len(), 1);
        assert_eq!(*slices[0], vec![1, 2, 3]);
    }
}
