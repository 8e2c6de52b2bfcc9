use crate::shuffle::ShuffleError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type StdResult<T, E> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed edge at line {line_number} ({line:?}): {reason}")]
    MalformedEdge {
        line_number: usize,
        line: String,
        reason: String,
    },

    #[error("node {0} received no self contribution in the collect phase")]
    MissingSelfContribution(u64),

    #[error("node {0} received more than one self contribution in the collect phase")]
    DuplicateSelfContribution(u64),

    #[error("task for partition #{partition} of stage #{stage_id} failed: {reason}")]
    TaskFailed {
        stage_id: usize,
        partition: usize,
        reason: String,
    },

    #[error("got split object of an unexpected concrete type in {0}")]
    DowncastSplit(&'static str),

    #[error("rdd #{rdd_id} has no split #{index}")]
    SplitOutOfRange { rdd_id: usize, index: usize },

    #[error("thread pool closed before all task results arrived")]
    ThreadPool,

    #[error("the ranking already finished, no further rounds can run")]
    EngineDone,

    #[error(transparent)]
    Shuffle(#[from] ShuffleError),

    #[error("invalid configuration: {0}")]
    Config(#[from] clap::Error),

    #[error("i/o failure")]
    Io(#[from] std::io::Error),
}

