use std::collections::HashSet;

use crate::level::MAX_LEVEL_ID;

/// The set of level ids the learner may enter. Starts at {1} and only ever
/// grows; a later failed retry never re-locks a level.
#[derive(Clone, Debug)]
pub struct Unlocks {
    ids: HashSet<u8>,
}

impl Default for Unlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl Unlocks {
    pub fn new() -> Self {
        let mut ids = HashSet::new();
        ids.insert(1);
        Self { ids }
    }

    pub fn is_unlocked(&self, id: u8) -> bool {
        self.ids.contains(&id)
    }

    /// Add `id` to the set. Returns true only when the id was newly added;
    /// ids beyond the last level are ignored. Union-only, never removes.
    pub fn unlock(&mut self, id: u8) -> bool {
        if id > MAX_LEVEL_ID {
            return false;
        }
        self.ids.insert(id)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }
}
