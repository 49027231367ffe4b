//! Integration tests for tagquery
//!
//! These tests wire the parser, resolvers, and cache together over the
//! in-memory store and verify complete query workflows end to end.

use std::sync::Arc;

use tagquery::query::{QueryValue, RangeExpr, UNMATCHED_TAG};
use tagquery::store::{MemoryStore, TagStore};
use tagquery::tag::{BackgroundQueue, CategoryResolver, RelatedTagService};
use tagquery::{QueryParser, TagCache, TagQueryConfig, TagRecord};

/// Queue double that runs refresh tasks synchronously
struct InlineQueue;

impl BackgroundQueue for InlineQueue {
    fn enqueue(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        task();
    }
}

/// Build a store with a small representative index
fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store.insert_tag(TagRecord::new("foo").with_post_count(100));
    store.insert_tag(TagRecord::new("food").with_post_count(50));
    store.insert_tag(TagRecord::new("blurry").with_post_count(5));
    store.insert_tag(
        TagRecord::new("some_artist")
            .with_post_count(30)
            .with_category(1),
    );
    store.insert_alias("oldname", "newname");
    store.insert_user("alice", 1);
    store.insert_user("bob", 2);
    store.insert_pool("scenery", 5);

    store
}

fn parser_for(store: &Arc<MemoryStore>) -> QueryParser {
    QueryParser::new(
        &TagQueryConfig::default(),
        store.clone(),
        store.clone(),
        store.clone(),
    )
}

#[test]
fn test_full_query_workflow() {
    let store = seeded_store();
    let parser = parser_for(&store);

    let q = parser
        .parse_query("fo* -blurry ~oldname uploader:alice pool:scenery rating:s width:800..1920")
        .unwrap();

    // Wildcard expansion, popularity ordered
    assert_eq!(
        q.tags.include,
        vec!["foo".to_string(), "food".to_string(), "newname".to_string()]
    );
    assert_eq!(q.tags.exclude, vec!["blurry".to_string()]);
    // Pool folded into the related tag set as a synthetic clause
    assert_eq!(q.tags.related, vec!["pool:5".to_string()]);
    assert_eq!(q.uploader_id, Some(1));
    assert_eq!(q.rating, Some("s".to_string()));
    assert_eq!(
        q.width,
        Some(RangeExpr::Between(
            QueryValue::Integer(800),
            QueryValue::Integer(1920)
        ))
    );
}

#[test]
fn test_typos_never_fail() {
    let store = seeded_store();
    let parser = parser_for(&store);

    let q = parser
        .parse_query("ratng:s -- width:wat date:2024-99-99 nosuch*")
        .unwrap();

    // Unknown prefix is a plain tag, bad operands are unsatisfiable
    assert!(q.tags.related.contains(&"ratng:s".to_string()));
    assert_eq!(q.width, Some(RangeExpr::Eq(QueryValue::None)));
    assert_eq!(q.date, Some(RangeExpr::Eq(QueryValue::None)));
    assert_eq!(q.tags.include, vec![UNMATCHED_TAG.to_string()]);
}

#[test]
fn test_category_cache_shields_the_store() {
    let store = seeded_store();
    let config = TagQueryConfig::default();
    let cache = Arc::new(TagCache::new(config.cache_capacity));
    let resolver = CategoryResolver::new(&config, cache, store.clone());

    // Write-through on save, then repeated reads
    resolver.update_category_cache("some_artist", 1);
    for _ in 0..5 {
        assert_eq!(resolver.category_for("some_artist").unwrap(), 1);
    }
    assert_eq!(store.category_select_count(), 0);

    // A name not yet cached goes to the store exactly once
    assert_eq!(resolver.category_for("foo").unwrap(), 0);
    assert_eq!(resolver.category_for("foo").unwrap(), 0);
    assert_eq!(store.category_select_count(), 1);
}

#[test]
fn test_related_refresh_full_cycle() {
    let store = seeded_store();
    store.insert_sample("foo", vec![("food".to_string(), 0.8), ("bar".to_string(), 0.3)]);

    let service = RelatedTagService::new(
        &TagQueryConfig::default(),
        store.clone(),
        store.clone(),
        Arc::new(InlineQueue),
    );

    // Stale read: returns current (empty) list and refreshes inline
    let stale = store.find_tag_by_name("foo").unwrap().unwrap();
    assert!(service.related_tag_array(&stale).is_empty());

    // The refresh has landed in the store
    let refreshed = store.find_tag_by_name("foo").unwrap().unwrap();
    let pairs = service.related_tag_array(&refreshed);
    assert_eq!(
        pairs,
        vec![
            ("food".to_string(), "0.8".to_string()),
            ("bar".to_string(), "0.3".to_string())
        ]
    );
}

#[test]
fn test_parser_is_shareable_across_threads() {
    let store = seeded_store();
    let parser = Arc::new(parser_for(&store));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let parser = parser.clone();
            std::thread::spawn(move || parser.parse_query(&format!("foo score:>{i}")).unwrap())
        })
        .collect();

    for handle in handles {
        let q = handle.join().unwrap();
        assert_eq!(q.tags.related, vec!["foo".to_string()]);
    }
}
