use dashmap::DashMap;

/// Keeps track of the shuffles whose map stage completed, keyed by shuffle id.
#[derive(Debug, Default)]
pub(crate) struct MapOutputTracker {
    map_outputs: DashMap<usize, usize>,
}

impl MapOutputTracker {
    pub fn new() -> Self {
        MapOutputTracker::default()
    }

    pub fn register_map_outputs(&self, shuffle_id: usize, num_map_outputs: usize) {
        log::debug!(
            "registering {} map outputs for shuffle #{}",
            num_map_outputs,
            shuffle_id
        );
        self.map_outputs.insert(shuffle_id, num_map_outputs);
    }

    pub fn get_num_map_outputs(&self, shuffle_id: usize) -> Option<usize> {
        self.map_outputs.get(&shuffle_id).map(|n| *n)
    }

    pub fn is_available(&self, shuffle_id: usize) -> bool {
        self.map_outputs.contains_key(&shuffle_id)
    }

    /// Forgets a shuffle, a later job reading it runs its map stage again.
    pub fn unregister(&self, shuffle_id: usize) {
        if self.map_outputs.remove(&shuffle_id).is_some() {
            log::debug!("unregistered map outputs of shuffle #{}", shuffle_id);
        }
    }

    pub fn num_registered(&self) -> usize {
        self.map_outputs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregister_makes_a_shuffle_missing() {
        let tracker = MapOutputTracker::new();
        tracker.register_map_outputs(0, 3);
        tracker.register_map_outputs(1, 2);
        assert_eq!(tracker.get_num_map_outputs(0), Some(3));

        tracker.unregister(0);
        assert!(!tracker.is_available(0));
        assert_eq!(tracker.get_num_map_outputs(0), None);
        assert!(tracker.is_available(1));
        assert_eq!(tracker.num_registered(), 1);
        tracker.unregister(0);
        assert_eq!(tracker.num_registered(), 1);
    }
}
