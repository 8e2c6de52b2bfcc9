//! A small in-process RDD engine and, on top of it, a PageRank variant with a
//! back-edge retention term.

pub mod context;
pub use context::*;

pub mod env;
pub use env::Configuration;

pub mod error;
pub use error::{Error, Result};

pub mod partitioner;
pub use partitioner::*;

pub mod rdd;
pub use rdd::*;

pub mod aggregator;
pub use aggregator::*;

mod dependency;

mod split;
pub use split::*;

mod map_output_tracker;

mod scheduler;
pub use scheduler::TaskContext;

pub mod serializable_traits;
pub use serializable_traits::*;

mod shuffle;
pub use shuffle::ShuffleError;

mod utils;

pub mod pagerank;
