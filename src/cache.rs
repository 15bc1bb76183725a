//! Bounded LRU cache for phonemization results.
//!
//! Keyed by `(language, raw text)`. The cache enforces both an entry-count
//! bound and a byte-size bound; eviction is strict least-recently-used.
//! Lookups go through a borrowed two-string key, so `get` and `contains`
//! never allocate, and values are shared as `Arc` so a hit hands back a
//! reference-count bump rather than a deep copy.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use derive_builder::Builder;

use crate::PhonemeResult;

const NIL: usize = usize::MAX;

/// Cache bounds.
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct CacheConfig {
    /// Maximum number of cached results.
    pub max_entries: usize,
    /// Maximum estimated total size in bytes.
    pub max_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStatistics {
    pub entries: usize,
    pub bytes: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// `hits / (hits + misses)`, 0 when the cache was never queried.
    pub hit_rate: f64,
}

/// Borrowed view of a cache key, so lookups need no owned strings.
trait KeyRef {
    fn language(&self) -> &str;
    fn text(&self) -> &str;
}

impl Hash for dyn KeyRef + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.language().hash(state);
        self.text().hash(state);
    }
}

impl PartialEq for dyn KeyRef + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.language() == other.language() && self.text() == other.text()
    }
}

impl Eq for dyn KeyRef + '_ {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    language: String,
    text: String,
}

impl KeyRef for CacheKey {
    fn language(&self) -> &str {
        &self.language
    }
    fn text(&self) -> &str {
        &self.text
    }
}

// Keep this in sync with `Hash for dyn KeyRef` so Borrow-based lookups
// agree with owned-key insertion.
impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.language.as_str().hash(state);
        self.text.as_str().hash(state);
    }
}

impl<'a> Borrow<dyn KeyRef + 'a> for CacheKey {
    fn borrow(&self) -> &(dyn KeyRef + 'a) {
        self
    }
}

struct Lookup<'a> {
    language: &'a str,
    text: &'a str,
}

impl KeyRef for Lookup<'_> {
    fn language(&self) -> &str {
        self.language
    }
    fn text(&self) -> &str {
        self.text
    }
}

struct Node {
    key: CacheKey,
    value: Arc<PhonemeResult>,
    size: u64,
    prev: usize,
    next: usize,
}

#[derive(Default)]
struct Inner {
    map: HashMap<CacheKey, usize>,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    bytes: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Thread-safe LRU cache of phonemization results.
pub struct ResultCache {
    config: CacheConfig,
    inner: Mutex<Inner>,
}

impl ResultCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                head: NIL,
                tail: NIL,
                ..Inner::default()
            }),
        }
    }

    /// Fetch a cached result, promoting it to most-recently-used.
    pub fn get(&self, language: &str, text: &str) -> Option<Arc<PhonemeResult>> {
        let mut inner = self.lock();
        let lookup = Lookup { language, text };
        match inner.map.get(&lookup as &dyn KeyRef).copied() {
            Some(idx) => {
                inner.unlink(idx);
                inner.push_front(idx);
                inner.hits += 1;
                inner.nodes[idx].as_ref().map(|n| Arc::clone(&n.value))
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Membership test without promoting the entry or touching counters.
    pub fn contains(&self, language: &str, text: &str) -> bool {
        let inner = self.lock();
        let lookup = Lookup { language, text };
        inner.map.contains_key(&lookup as &dyn KeyRef)
    }

    /// Insert a result, evicting least-recently-used entries until both
    /// bounds hold. An existing entry for the same key is replaced with
    /// exact size re-accounting (last writer wins).
    pub fn insert(&self, language: &str, text: &str, value: PhonemeResult) {
        let size = estimate_size(language, text, &value);
        if size > self.config.max_bytes || self.config.max_entries == 0 {
            log::debug!("skipping cache insert of oversize entry ({size} bytes)");
            return;
        }

        let key = CacheKey {
            language: language.to_string(),
            text: text.to_string(),
        };
        let mut inner = self.lock();

        if let Some(&idx) = inner.map.get(&key) {
            inner.unlink(idx);
            inner.remove_node(idx);
            inner.map.remove(&key);
        }

        while inner.map.len() >= self.config.max_entries
            || inner.bytes + size > self.config.max_bytes
        {
            if !inner.evict_tail() {
                break;
            }
        }

        let node = Node {
            key: key.clone(),
            value: Arc::new(value),
            size,
            prev: NIL,
            next: NIL,
        };
        let idx = inner.alloc(node);
        inner.push_front(idx);
        inner.bytes += size;
        inner.map.insert(key, idx);
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.nodes.clear();
        inner.free.clear();
        inner.head = NIL;
        inner.tail = NIL;
        inner.bytes = 0;
    }

    pub fn statistics(&self) -> CacheStatistics {
        let inner = self.lock();
        let queried = inner.hits + inner.misses;
        CacheStatistics {
            entries: inner.map.len(),
            bytes: inner.bytes,
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            hit_rate: if queried == 0 {
                0.0
            } else {
                inner.hits as f64 / queried as f64
            },
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned cache lock only means a panicking thread mid-update;
        // the structure is still navigable, so keep serving.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Inner {
    fn alloc(&mut self, node: Node) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            if let Some(node) = self.nodes[old_head].as_mut() {
                node.prev = idx;
            }
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.nodes[idx].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        if prev != NIL {
            if let Some(node) = self.nodes[prev].as_mut() {
                node.next = next;
            }
        } else {
            self.head = next;
        }
        if next != NIL {
            if let Some(node) = self.nodes[next].as_mut() {
                node.prev = prev;
            }
        } else {
            self.tail = prev;
        }
    }

    fn remove_node(&mut self, idx: usize) {
        if let Some(node) = self.nodes[idx].take() {
            self.bytes -= node.size;
            self.free.push(idx);
        }
    }

    fn evict_tail(&mut self) -> bool {
        let idx = self.tail;
        if idx == NIL {
            return false;
        }
        self.unlink(idx);
        if let Some(node) = self.nodes[idx].take() {
            self.bytes -= node.size;
            self.map.remove(&node.key);
            self.free.push(idx);
            self.evictions += 1;
        }
        true
    }
}

fn estimate_size(language: &str, text: &str, value: &PhonemeResult) -> u64 {
    let phoneme_bytes: usize = value.phonemes.iter().map(|p| p.len() * 4).sum();
    (language.len() + text.len() + phoneme_bytes + 64) as u64
}
