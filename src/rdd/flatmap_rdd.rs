use std::marker::PhantomData;
use std::sync::Arc;

use crate::context::Context;
use crate::dependency::{Dependency, OneToOneDependency};
use crate::error::Result;
use crate::rdd::{Rdd, RddBase, RddVals};
use crate::serializable_traits::{Data, Func};
use crate::split::Split;

pub struct FlatMapperRdd<T: Data, U: Data, F>
where
    F: Func<T, Box<dyn Iterator<Item = U>>>,
{
    prev: Arc<dyn Rdd<Item = T>>,
    vals: Arc<RddVals>,
    func: F,
    _marker_t: PhantomData<U>,
}

impl<T: Data, U: Data, F> Clone for FlatMapperRdd<T, U, F>
where
    F: Func<T, Box<dyn Iterator<Item = U>>>,
{
    fn clone(&self) -> Self {
        FlatMapperRdd {
            prev: self.prev.clone(),
            vals: self.vals.clone(),
            func: self.func.clone(),
            _marker_t: PhantomData,
        }
    }
}

impl<T: Data, U: Data, F> FlatMapperRdd<T, U, F>
where
    F: Func<T, Box<dyn Iterator<Item = U>>>,
{
    pub(crate) fn new(prev: Arc<dyn Rdd<Item = T>>, func: F) -> Self {
        let mut vals = RddVals::new(prev.get_context());
        vals.dependencies
            .push(Dependency::NarrowDependency(Arc::new(
                OneToOneDependency::new(prev.get_rdd_base()),
            )));
        FlatMapperRdd {
            prev,
            vals: Arc::new(vals),
            func,
            _marker_t: PhantomData,
        }
    }
}

impl<T: Data, U: Data, F> RddBase for FlatMapperRdd<T, U, F>
where
    F: Func<T, Box<dyn Iterator<Item = U>>>,
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

impl<T: Data, U: Data, F> Rdd for FlatMapperRdd<T, U, F>
where
    F: Func<T, Box<dyn Iterator<Item = U>>>,
{
    type Item = U;
    fn get_rdd_base(&self) -> Arc<dyn RddBase> {
        Arc::new(self.clone()) as Arc<dyn RddBase>
    }

    fn get_rdd(&self) -> Arc<dyn Rdd<Item = Self::Item>> {
        Arc::new(self.clone())
    }

    fn compute(&self, split: Box<dyn Split>) -> Result<Box<dyn Iterator<Item = Self::Item>>> {
        let f = self.func.clone();
        Ok(Box::new(self.prev.iterator(split)?.flat_map(f)))
    }
}
