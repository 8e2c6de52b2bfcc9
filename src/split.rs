use downcast_rs::{impl_downcast, DowncastSync};

/// A handle to one partition of an RDD.
pub trait Split: DowncastSync + dyn_clone::DynClone {
    fn get_index(&self) -> usize;
}

impl_downcast!(sync Split);
dyn_clone::clone_trait_object!(Split);
