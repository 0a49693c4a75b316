// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Bounded map with least-recently-used eviction.
//!
//! Entries live in a dense arena and are threaded on a doubly linked recency list by index,
//! most recently used at the head. A hash index maps keys to arena slots. Removing an entry
//! moves the last arena slot into the hole, so the arena never has gaps and every operation
//! is O(1).

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Outcome of [`LruMap::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Put<K, V> {
    /// The key was new and there was room for it.
    Inserted,
    /// The key was present; its previous value is returned.
    Replaced(V),
    /// The key was new and the map was full: the least recently used entry made room.
    Evicted { key: K, value: V },
}

#[derive(Debug)]
pub struct LruMap<K, V, S = RandomState> {
    index: HashMap<K, usize, S>,
    nodes: Vec<Node<K, V>>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruMap<K, V, RandomState> {
    /// An empty map holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, RandomState::with_seeds(0, 0, 0, 0))
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruMap<K, V, S> {
    #[must_use]
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = capacity.max(1);
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, hasher),
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look a key up and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        Some(&self.nodes[idx].value)
    }

    /// Look a key up without affecting recency.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.nodes[idx].value)
    }

    /// Insert or update a key, making it the most recently used.
    pub fn put(&mut self, key: K, value: V) -> Put<K, V> {
        if let Some(&idx) = self.index.get(&key) {
            let old = std::mem::replace(&mut self.nodes[idx].value, value);
            self.touch(idx);
            return Put::Replaced(old);
        }
        let evicted = if self.nodes.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };
        self.nodes.push(Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        });
        let idx = self.nodes.len() - 1;
        self.link_front(idx);
        self.index.insert(key, idx);
        match evicted {
            Some((key, value)) => Put::Evicted { key, value },
            None => Put::Inserted,
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.remove(key)?;
        Some(self.take(idx).value)
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            map: self,
            cursor: self.head,
        }
    }

    fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        self.index.remove(&self.nodes[idx].key);
        let node = self.take(idx);
        Some((node.key, node.value))
    }

    fn touch(&mut self, idx: usize) {
        if self.head != idx {
            self.unlink(idx);
            self.link_front(idx);
        }
    }

    fn link_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head == NIL {
            self.tail = idx;
        } else {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
    }

    /// Unlink and remove the node at `idx`. Its key must already be out of the index.
    fn take(&mut self, idx: usize) -> Node<K, V> {
        self.unlink(idx);
        let node = self.nodes.swap_remove(idx);
        if idx < self.nodes.len() {
            // the former last node now sits at idx
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            if prev == NIL {
                self.head = idx;
            } else {
                self.nodes[prev].next = idx;
            }
            if next == NIL {
                self.tail = idx;
            } else {
                self.nodes[next].prev = idx;
            }
            if let Some(slot) = self.index.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }
        node
    }
}

/// Iterator over an [`LruMap`], most recently used first.
pub struct Iter<'a, K, V, S> {
    map: &'a LruMap<K, V, S>,
    cursor: usize,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.map.nodes.get(self.cursor)?;
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
mod test {
    use super::{LruMap, Put};

    fn keys(map: &LruMap<u32, &'static str>) -> Vec<u32> {
        map.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn recency_order() {
        let mut map = LruMap::new(4);
        assert_eq!(map.put(1, "a"), Put::Inserted);
        assert_eq!(map.put(2, "b"), Put::Inserted);
        assert_eq!(map.put(3, "c"), Put::Inserted);
        assert_eq!(keys(&map), vec![3, 2, 1]);

        assert_eq!(map.get(&1), Some(&"a"));
        assert_eq!(keys(&map), vec![1, 3, 2]);

        // peeking does not promote
        assert_eq!(map.peek(&2), Some(&"b"));
        assert_eq!(keys(&map), vec![1, 3, 2]);

        assert_eq!(map.put(2, "B"), Put::Replaced("b"));
        assert_eq!(keys(&map), vec![2, 1, 3]);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut map = LruMap::new(3);
        map.put(1, "a");
        map.put(2, "b");
        map.put(3, "c");
        map.get(&1);
        assert_eq!(
            map.put(4, "d"),
            Put::Evicted {
                key: 2,
                value: "b"
            }
        );
        assert_eq!(map.len(), 3);
        assert_eq!(map.peek(&2), None);
        assert_eq!(keys(&map), vec![4, 1, 3]);
    }

    #[test]
    fn remove_keeps_links_consistent() {
        let mut map = LruMap::new(8);
        for k in 0..6 {
            map.put(k, "x");
        }
        // remove from the middle, the head and the tail; each moves the last arena slot
        assert_eq!(map.remove(&2), Some("x"));
        assert_eq!(map.remove(&5), Some("x"));
        assert_eq!(map.remove(&0), Some("x"));
        assert_eq!(map.remove(&0), None);
        assert_eq!(keys(&map), vec![4, 3, 1]);
        for k in [1, 3, 4] {
            assert_eq!(map.peek(&k), Some(&"x"));
        }
        map.get(&1);
        assert_eq!(keys(&map), vec![1, 4, 3]);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(keys(&map), Vec::<u32>::new());
        map.put(9, "y");
        assert_eq!(keys(&map), vec![9]);
    }

    #[test]
    fn capacity_of_one() {
        let mut map = LruMap::new(0);
        assert_eq!(map.capacity(), 1);
        map.put(1, "a");
        assert_eq!(
            map.put(2, "b"),
            Put::Evicted {
                key: 1,
                value: "a"
            }
        );
        assert_eq!(keys(&map), vec![2]);
    }
}
