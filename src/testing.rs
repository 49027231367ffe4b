//! Testing utilities for tagquery
//!
//! Helper types shared across the unit and integration tests: queue
//! doubles for the background refresh path and a seeded in-memory store.
//!
//! Only available when compiled with `cfg(test)`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::TagRecord;
use crate::store::MemoryStore;
use crate::tag::BackgroundQueue;

/// Queue that runs every task immediately on the calling thread
///
/// Makes the fire-and-forget refresh path synchronous and deterministic
/// for tests.
pub struct InlineQueue;

impl BackgroundQueue for InlineQueue {
    fn enqueue(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        task();
    }
}

/// Queue that counts enqueued tasks without running them
///
/// Used to assert that a read path did (or did not) schedule a refresh.
#[derive(Default)]
pub struct RecordingQueue {
    count: AtomicUsize,
}

impl RecordingQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks handed to the queue so far
    #[must_use]
    pub fn enqueued(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl BackgroundQueue for RecordingQueue {
    fn enqueue(&self, _task: Box<dyn FnOnce() + Send + 'static>) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A store populated with a small, representative tag index
///
/// Tags: `foo` (100 posts), `food` (50), `bar` (200, category 1),
/// `landscape` (10). Alias: `oldname` -> `newname`. User `alice` (id 1),
/// pool `scenery` (id 5).
#[must_use]
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store.insert_tag(TagRecord::new("foo").with_post_count(100));
    store.insert_tag(TagRecord::new("food").with_post_count(50));
    store.insert_tag(TagRecord::new("bar").with_post_count(200).with_category(1));
    store.insert_tag(TagRecord::new("landscape").with_post_count(10));
    store.insert_alias("oldname", "newname");
    store.insert_user("alice", 1);
    store.insert_pool("scenery", 5);

    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_queue_runs_immediately() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = ran.clone();

        InlineQueue.enqueue(Box::new(move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recording_queue_counts_without_running() {
        let queue = RecordingQueue::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = ran.clone();

        queue.enqueue(Box::new(move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(queue.enqueued(), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_seeded_store_contents() {
        use crate::store::TagStore;

        let store = seeded_store();
        assert!(store.find_tag_by_name("foo").unwrap().is_some());
        assert_eq!(
            store.find_tag_by_name("bar").unwrap().unwrap().category,
            1
        );
    }
}
