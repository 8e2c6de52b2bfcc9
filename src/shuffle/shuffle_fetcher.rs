use crate::env::Env;
use crate::serializable_traits::Data;
use crate::shuffle::{Result, ShuffleError};

/// Reads the buckets every map task wrote for one reduce partition.
pub(crate) struct ShuffleFetcher;

impl ShuffleFetcher {
    pub fn fetch<K: Data, C: Data>(
        env: &Env,
        shuffle_id: usize,
        reduce_id: usize,
        mut func: impl FnMut((K, C)),
    ) -> Result<()> {
        log::debug!("inside fetch function");
        let num_map_outputs = env
            .map_output_tracker
            .get_num_map_outputs(shuffle_id)
            .ok_or(ShuffleError::MissingMapOutputs(shuffle_id))?;
        log::debug!(
            "fetching {} map outputs for shuffle id {}, reduce id {}",
            num_map_outputs,
            shuffle_id,
            reduce_id
        );
        for map_id in 0..num_map_outputs {
            let bytes = env
                .shuffle_manager
                .get_bucket(shuffle_id, map_id, reduce_id)
                .ok_or(ShuffleError::FailedFetchOp {
                    shuffle_id,
                    map_id,
                    reduce_id,
                })?;
            let input: Vec<(K, C)> = bincode::deserialize(&bytes)?;
            for (k, c) in input {
                func((k, c));
            }
        }
        Ok(())
    }
}
