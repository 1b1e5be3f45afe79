use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::feed::CheckpointFeed;

/// Maps run ids to their broadcast feeds.
#[derive(Clone, Default)]
pub struct FeedRegistry {
    feeds: Arc<RwLock<HashMap<Uuid, Arc<CheckpointFeed>>>>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, run_id: Uuid) -> Arc<CheckpointFeed> {
        {
            let feeds = self
                .feeds
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(feed) = feeds.get(&run_id) {
                return Arc::clone(feed);
            }
        }

        let mut feeds = self
            .feeds
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(feed) = feeds.get(&run_id) {
            return Arc::clone(feed);
        }

        let feed = Arc::new(CheckpointFeed::new(run_id));
        feeds.insert(run_id, Arc::clone(&feed));
        feed
    }

    pub fn get(&self, run_id: &Uuid) -> Option<Arc<CheckpointFeed>> {
        self.feeds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(run_id)
            .cloned()
    }

    pub fn remove(&self, run_id: &Uuid) -> Option<Arc<CheckpointFeed>> {
        self.feeds
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(run_id)
    }

    pub fn run_ids(&self) -> Vec<Uuid> {
        self.feeds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.feeds
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
