use crate::serializable_traits::Data;
use crate::shuffle::Result;
use dashmap::DashMap;

/// In-memory store of serialized shuffle buckets.
///
/// Every shuffle map task writes one bucket per reduce partition, keyed by
/// `(shuffle_id, map_id, reduce_id)`.
#[derive(Debug, Default)]
pub(crate) struct ShuffleManager {
    shuffle_cache: DashMap<(usize, usize, usize), Vec<u8>>,
}

impl ShuffleManager {
    pub fn new() -> Self {
        ShuffleManager::default()
    }

    pub fn put_bucket<K: Data, C: Data>(
        &self,
        shuffle_id: usize,
        map_id: usize,
        reduce_id: usize,
        bucket: &[(K, C)],
    ) -> Result<()> {
        let ser_bytes = bincode::serialize(bucket)?;
        log::debug!(
            "storing {} records ({} bytes) for shuffle #{}, map #{}, reduce #{}",
            bucket.len(),
            ser_bytes.len(),
            shuffle_id,
            map_id,
            reduce_id
        );
        self.shuffle_cache
            .insert((shuffle_id, map_id, reduce_id), ser_bytes);
        Ok(())
    }

    pub fn get_bucket(&self, shuffle_id: usize, map_id: usize, reduce_id: usize) -> Option<Vec<u8>> {
        self.shuffle_cache
            .get(&(shuffle_id, map_id, reduce_id))
            .map(|bytes| bytes.value().clone())
    }

    /// Drops every bucket of `shuffle_id`, returns how many were stored.
    pub fn remove_shuffle(&self, shuffle_id: usize) -> usize {
        let before = self.shuffle_cache.len();
        self.shuffle_cache
            .retain(|&(stored_id, _, _), _| stored_id != shuffle_id);
        before - self.shuffle_cache.len()
    }

    pub fn num_buckets(&self) -> usize {
        self.shuffle_cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_round_trip() -> Result<()> {
        let manager = ShuffleManager::new();
        manager.put_bucket(0, 0, 1, &[(1u64, 0.5f64), (2, 0.25)])?;
        manager.put_bucket(1, 0, 0, &[(3u64, 1.0f64)])?;
        let bytes = manager.get_bucket(0, 0, 1).unwrap();
        let bucket: Vec<(u64, f64)> = bincode::deserialize(&bytes)?;
        assert_eq!(bucket, vec![(1, 0.5), (2, 0.25)]);
        assert!(manager.get_bucket(0, 1, 1).is_none());
        assert!(manager.get_bucket(1, 0, 0).is_some());
        Ok(())
    }

    #[test]
    fn removing_a_shuffle_keeps_the_others() -> Result<()> {
        let manager = ShuffleManager::new();
        for map_id in 0..3 {
            for reduce_id in 0..2 {
                manager.put_bucket(4, map_id, reduce_id, &[(map_id as u64, reduce_id as u64)])?;
            }
        }
        manager.put_bucket(5, 0, 0, &[(0u64, 0u64)])?;
        assert_eq!(manager.num_buckets(), 7);

        assert_eq!(manager.remove_shuffle(4), 6);
        assert_eq!(manager.num_buckets(), 1);
        assert!(manager.get_bucket(4, 2, 1).is_none());
        assert!(manager.get_bucket(5, 0, 0).is_some());
        assert_eq!(manager.remove_shuffle(4), 0);
        Ok(())
    }
}
