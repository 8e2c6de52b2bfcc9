use thiserror::Error;

mod shuffle_fetcher;
mod shuffle_manager;

pub(crate) use shuffle_fetcher::ShuffleFetcher;
pub(crate) use shuffle_manager::ShuffleManager;

pub(crate) type Result<T> = crate::error::StdResult<T, ShuffleError>;

#[derive(Debug, Error)]
pub enum ShuffleError {
    #[error("failed to (de)serialize shuffle data")]
    Serialization(#[from] bincode::Error),

    #[error("no map output for shuffle #{shuffle_id}, map #{map_id}, reduce #{reduce_id}")]
    FailedFetchOp {
        shuffle_id: usize,
        map_id: usize,
        reduce_id: usize,
    },

    #[error("map outputs of shuffle #{0} are not registered")]
    MissingMapOutputs(usize),
}
