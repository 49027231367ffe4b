//! Lazy related-tag refresh
//!
//! Each tag carries a cached related-tag list with a staleness window
//! derived from its popularity: `sqrt(post_count)` hours, capped at 24.
//! Established tags therefore keep their list longer. The refresh is
//! fire-and-forget: a stale read returns the cached list immediately and
//! hands the recomputation to a background queue; the queue consumer owns
//! retry and failure handling.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::TagQueryConfig;
use crate::TagRecord;
use crate::store::{RelatedTagSampler, StoreError, TagStore};

/// Fire-and-forget background task execution
pub trait BackgroundQueue: Send + Sync {
    /// Hand a task to the queue; returns without waiting for it to run
    fn enqueue(&self, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Queue backed by the rayon global thread pool
pub struct RayonQueue;

impl BackgroundQueue for RayonQueue {
    fn enqueue(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        rayon::spawn(task);
    }
}

/// Maintains per-tag related-tag lists on a popularity-derived schedule
pub struct RelatedTagService {
    store: Arc<dyn TagStore>,
    sampler: Arc<dyn RelatedTagSampler>,
    queue: Arc<dyn BackgroundQueue>,
    expiry_cap_hours: f64,
}

impl RelatedTagService {
    #[must_use]
    pub fn new(
        config: &TagQueryConfig,
        store: Arc<dyn TagStore>,
        sampler: Arc<dyn RelatedTagSampler>,
        queue: Arc<dyn BackgroundQueue>,
    ) -> Self {
        Self {
            store,
            sampler,
            queue,
            expiry_cap_hours: config.related_expiry_cap_hours,
        }
    }

    /// Hours the cached related-tag list stays fresh for this tag
    #[must_use]
    pub fn expiry_hours(&self, tag: &TagRecord) -> f64 {
        (tag.post_count as f64).sqrt().min(self.expiry_cap_hours)
    }

    /// Whether the cached list is stale, judged against an explicit clock
    #[must_use]
    pub fn should_update_at(&self, tag: &TagRecord, now: DateTime<Utc>) -> bool {
        if tag.related_tags.is_empty() {
            return true;
        }
        let Some(updated_at) = tag.related_tags_updated_at else {
            return true;
        };

        let window = Duration::seconds((self.expiry_hours(tag) * 3600.0) as i64);
        updated_at < now - window
    }

    /// Whether the cached list is stale right now
    #[must_use]
    pub fn should_update(&self, tag: &TagRecord) -> bool {
        self.should_update_at(tag, Utc::now())
    }

    /// Recompute and persist the related-tag list synchronously
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if sampling or the persisting write fails.
    pub fn update(&self, tag: &TagRecord) -> Result<(), StoreError> {
        recompute(self.store.as_ref(), self.sampler.as_ref(), &tag.name)
    }

    /// Enqueue a background refresh when the cached list is stale
    pub fn refresh_if_stale(&self, tag: &TagRecord) {
        if !self.should_update(tag) {
            return;
        }

        let store = Arc::clone(&self.store);
        let sampler = Arc::clone(&self.sampler);
        let name = tag.name.clone();
        self.queue.enqueue(Box::new(move || {
            // Failure handling belongs to the queue consumer; the read
            // path that triggered this has already returned.
            let _ = recompute(store.as_ref(), sampler.as_ref(), &name);
        }));
    }

    /// The tag's related (name, strength) pairs, possibly stale
    ///
    /// Returns the cached pairs immediately; staleness only triggers a
    /// background refresh, it never blocks this read.
    #[must_use]
    pub fn related_tag_array(&self, tag: &TagRecord) -> Vec<(String, String)> {
        self.refresh_if_stale(tag);

        tag.related_tags
            .chunks(2)
            .map(|pair| {
                let name = pair[0].clone();
                let strength = pair.get(1).cloned().unwrap_or_default();
                (name, strength)
            })
            .collect()
    }
}

fn recompute(
    store: &dyn TagStore,
    sampler: &dyn RelatedTagSampler,
    name: &str,
) -> Result<(), StoreError> {
    let pairs = sampler.compute_related(name)?;

    let mut flat = Vec::with_capacity(pairs.len() * 2);
    for (related_name, strength) in pairs {
        flat.push(related_name);
        flat.push(strength.to_string());
    }

    store.save_related_tags(name, &flat, Utc::now())
}
