//! Bidirectional tag registry.
//!
//! Tracks which cached responses carry which tags so a single tag can drop
//! every dependent entry without touching the rest of the cache. The registry
//! holds no lock of its own; the fetch cache keeps it behind the same guard as
//! the stored bodies so the two never disagree.

use std::collections::{HashMap, HashSet};

use super::keys::FetchKey;

/// Tracks tag → keys and key → tags mappings.
#[derive(Debug, Default)]
pub struct TagRegistry {
    tag_to_keys: HashMap<String, HashSet<FetchKey>>,
    key_to_tags: HashMap<FetchKey, HashSet<String>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `tags` to `key`, replacing whatever the key carried before.
    pub fn register<'a>(&mut self, key: &FetchKey, tags: impl IntoIterator<Item = &'a str>) {
        self.unregister(key);

        let tags: HashSet<String> = tags.into_iter().map(str::to_string).collect();
        if tags.is_empty() {
            return;
        }
        for tag in &tags {
            self.tag_to_keys
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        self.key_to_tags.insert(key.clone(), tags);
    }

    /// Forget a key, typically after eviction or expiry.
    pub fn unregister(&mut self, key: &FetchKey) {
        let Some(tags) = self.key_to_tags.remove(key) else {
            return;
        };
        for tag in tags {
            if let Some(keys) = self.tag_to_keys.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_to_keys.remove(&tag);
                }
            }
        }
    }

    /// Remove a tag and every key carrying it. Returns the affected keys.
    pub fn take_tag(&mut self, tag: &str) -> HashSet<FetchKey> {
        let keys = self.tag_to_keys.remove(tag).unwrap_or_default();
        for key in &keys {
            self.unregister(key);
        }
        keys
    }

    pub fn keys_for_tag(&self, tag: &str) -> HashSet<FetchKey> {
        self.tag_to_keys.get(tag).cloned().unwrap_or_default()
    }

    pub fn tags_for_key(&self, key: &FetchKey) -> HashSet<String> {
        self.key_to_tags.get(key).cloned().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.tag_to_keys.clear();
        self.key_to_tags.clear();
    }

    pub fn tag_count(&self) -> usize {
        self.tag_to_keys.len()
    }

    pub fn key_count(&self) -> usize {
        self.key_to_tags.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> FetchKey {
        FetchKey::new("https://cms.example.com/graphql", name.as_bytes())
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TagRegistry::new();
        let first = key("first");

        registry.register(&first, ["posts", "post-hello"]);

        assert!(registry.keys_for_tag("posts").contains(&first));
        assert!(registry.tags_for_key(&first).contains("post-hello"));
        assert_eq!(registry.tag_count(), 2);
    }

    #[test]
    fn take_tag_detaches_other_tags_of_affected_keys() {
        let mut registry = TagRegistry::new();
        let first = key("first");
        let second = key("second");

        registry.register(&first, ["posts", "post-hello"]);
        registry.register(&second, ["posts"]);

        let affected = registry.take_tag("posts");
        assert_eq!(affected.len(), 2);
        assert!(registry.keys_for_tag("post-hello").is_empty());
        assert_eq!(registry.key_count(), 0);
        assert_eq!(registry.tag_count(), 0);
    }

    #[test]
    fn re_registering_replaces_tags() {
        let mut registry = TagRegistry::new();
        let first = key("first");

        registry.register(&first, ["posts"]);
        registry.register(&first, ["related-posts"]);

        assert!(registry.keys_for_tag("posts").is_empty());
        assert!(registry.keys_for_tag("related-posts").contains(&first));
    }

    #[test]
    fn untagged_keys_are_not_tracked() {
        let mut registry = TagRegistry::new();
        registry.register(&key("plain"), []);
        assert_eq!(registry.key_count(), 0);
    }

    #[test]
    fn unregister_cleans_up_mappings() {
        let mut registry = TagRegistry::new();
        let first = key("first");
        registry.register(&first, ["posts"]);

        registry.unregister(&first);
        assert_eq!(registry.key_count(), 0);
        assert_eq!(registry.tag_count(), 0);

        registry.register(&first, ["posts"]);
        registry.clear();
        assert_eq!(registry.key_count(), 0);
    }
}
