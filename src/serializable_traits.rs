use std::{any, fmt};

// Data passing through RDD needs to satisfy the following traits.
// Serialize/Deserialize are required since every record crossing a shuffle is
// encoded into the shuffle store.
pub trait Data:
    Clone
    + any::Any
    + Send
    + Sync
    + fmt::Debug
    + serde::ser::Serialize
    + serde::de::DeserializeOwned
    + 'static
{
}

impl<
        T: Clone
            + any::Any
            + Send
            + Sync
            + fmt::Debug
            + serde::ser::Serialize
            + serde::de::DeserializeOwned
            + 'static,
    > Data for T
{
}

/// Closures shipped to tasks. They are cloned into every task of a stage and
/// invoked from the scheduler's worker threads.
pub trait Func<Args, Output>: Fn(Args) -> Output + Clone + Send + Sync + 'static {}

impl<Args, Output, F> Func<Args, Output> for F where
    F: Fn(Args) -> Output + Clone + Send + Sync + 'static
{
}
