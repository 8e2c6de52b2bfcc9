#![allow(clippy::module_inception)]

mod rdd;
pub use rdd::*;
pub mod parallel_collection_rdd;
pub use parallel_collection_rdd::*;
pub mod mapper_rdd;
pub use mapper_rdd::*;
pub mod flatmap_rdd;
pub use flatmap_rdd::*;
pub mod map_partitions_rdd;
pub use map_partitions_rdd::*;
pub mod pair_rdd;
pub use pair_rdd::*;
pub mod shuffled_rdd;
pub use shuffled_rdd::ShuffledRdd;
pub mod sorted_rdd;
pub use sorted_rdd::SortedRdd;
