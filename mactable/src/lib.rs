// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::module_name_repetitions)]

//! Address learning table.
//!
//! For every switch, the table remembers which port each `(MAC, VLAN)` pair was last seen
//! on. Each switch gets its own bounded cache ([`DEFAULT_CAPACITY`] entries) with
//! least-recently-used eviction, behind its own lock, so switches never contend with each
//! other. The switch map itself is sharded.

pub mod lru;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use ahash::RandomState;
use dashmap::DashMap;
use net::{Mac, VlanTag};
use ofproto::{PortNo, SwitchId};
use parking_lot::Mutex;
use tracectl::trace_target;
use tracing::{debug, trace};

use crate::lru::{LruMap, Put};

trace_target!("mactable", tracectl::LevelFilter::INFO, &["learning"]);

/// Entries kept per switch.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Key of a learned entry.
///
/// [`VlanTag`] is already normalized, so the untagged sentinel and VLAN 0 are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressKey {
    pub mac: Mac,
    pub vlan: VlanTag,
}

impl AddressKey {
    #[must_use]
    pub fn new(mac: Mac, vlan: VlanTag) -> Self {
        Self { mac, vlan }
    }
}

/// One learned association, as reported by [`MacTable::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LearnedEntry {
    pub mac: Mac,
    pub vlan: VlanTag,
    pub port: PortNo,
}

type SwitchCache = Arc<Mutex<LruMap<AddressKey, PortNo>>>;

fn hasher_state() -> &'static RandomState {
    static HASHER_STATE: OnceLock<RandomState> = OnceLock::new();
    HASHER_STATE.get_or_init(|| RandomState::with_seeds(0, 0, 0, 0))
}

/// Per-switch `(MAC, VLAN) -> port` associations.
pub struct MacTable {
    switches: DashMap<SwitchId, SwitchCache, RandomState>,
    capacity: usize,
}

impl Default for MacTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MacTable {
    /// A table keeping at most `capacity` entries per switch.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            switches: DashMap::with_hasher(hasher_state().clone()),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Handing out a clone of the Arc keeps the map shard locked only for the lookup.
    fn cache(&self, switch: SwitchId) -> Option<SwitchCache> {
        self.switches.get(&switch).map(|c| Arc::clone(c.value()))
    }

    fn cache_or_create(&self, switch: SwitchId) -> SwitchCache {
        let entry = self.switches.entry(switch).or_insert_with(|| {
            debug!("Creating learning table for switch {switch}");
            Arc::new(Mutex::new(LruMap::with_hasher(
                self.capacity,
                hasher_state().clone(),
            )))
        });
        Arc::clone(entry.value())
    }

    /// Record that `mac` on `vlan` is reachable through `port` of `switch`.
    ///
    /// Returns the port previously recorded for the pair, if any. A full switch cache first
    /// drops its least recently used entry.
    pub fn learn(&self, switch: SwitchId, mac: Mac, vlan: VlanTag, port: PortNo) -> Option<PortNo> {
        let key = AddressKey::new(mac, vlan);
        let cache = self.cache_or_create(switch);
        let outcome = cache.lock().put(key, port);
        match outcome {
            Put::Inserted => {
                trace!("{switch}: learned {} vlan {} on port {port}", key.mac, key.vlan);
                None
            }
            Put::Replaced(old) => {
                if old != port {
                    debug!(
                        "{switch}: {} vlan {} moved from port {old} to {port}",
                        key.mac, key.vlan
                    );
                }
                Some(old)
            }
            Put::Evicted { key: gone, value } => {
                debug!(
                    "{switch}: table full, evicted {} vlan {} (port {value})",
                    gone.mac, gone.vlan
                );
                None
            }
        }
    }

    /// The port `mac` on `vlan` was learned on. A hit makes the entry most recently used.
    #[must_use]
    pub fn lookup(&self, switch: SwitchId, mac: Mac, vlan: VlanTag) -> Option<PortNo> {
        let key = AddressKey::new(mac, vlan);
        let cache = self.cache(switch)?;
        cache.lock().get(&key).copied()
    }

    /// Drop what was learned about `mac` on `vlan`, returning its port.
    pub fn forget(&self, switch: SwitchId, mac: Mac, vlan: VlanTag) -> Option<PortNo> {
        let key = AddressKey::new(mac, vlan);
        let cache = self.cache(switch)?;
        let port = cache.lock().remove(&key);
        if let Some(port) = port {
            trace!("{switch}: forgot {} vlan {} (port {port})", key.mac, key.vlan);
        }
        port
    }

    /// Drop everything learned on every switch.
    pub fn clear_all(&self) {
        debug!("Clearing learning tables of all switches");
        self.switches.clear();
    }

    /// Drop everything learned on `switch`.
    pub fn clear_switch(&self, switch: SwitchId) {
        if self.switches.remove(&switch).is_some() {
            debug!("Cleared learning table of switch {switch}");
        }
    }

    /// Number of entries learned on `switch`.
    #[must_use]
    pub fn entry_count(&self, switch: SwitchId) -> usize {
        self.cache(switch).map_or(0, |c| c.lock().len())
    }

    /// Switches with a learning table, in ascending order.
    #[must_use]
    pub fn switches(&self) -> Vec<SwitchId> {
        let mut ids: Vec<_> = self.switches.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Entries learned on `switch`, most recently used first. Recency is not affected.
    #[must_use]
    pub fn entries(&self, switch: SwitchId) -> Vec<LearnedEntry> {
        let Some(cache) = self.cache(switch) else {
            return Vec::new();
        };
        let cache = cache.lock();
        cache
            .iter()
            .map(|(key, port)| LearnedEntry {
                mac: key.mac,
                vlan: key.vlan,
                port: *port,
            })
            .collect()
    }

    /// Entries of every switch.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<SwitchId, Vec<LearnedEntry>> {
        self.switches()
            .into_iter()
            .map(|switch| (switch, self.entries(switch)))
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use net::{Mac, VlanTag};
    use ofproto::{PortNo, SwitchId};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{DEFAULT_CAPACITY, LearnedEntry, MacTable};

    const SW1: SwitchId = SwitchId(1);
    const SW2: SwitchId = SwitchId(2);

    fn v(raw: u16) -> VlanTag {
        VlanTag::new(raw)
    }

    fn mac(n: u64) -> Mac {
        Mac::from_u64(0x0200_0000_0000 | n)
    }

    #[test]
    fn learn_then_lookup() {
        let table = MacTable::default();
        assert_eq!(table.lookup(SW1, mac(1), v(10)), None);
        assert_eq!(table.learn(SW1, mac(1), v(10), PortNo(3)), None);
        assert_eq!(table.lookup(SW1, mac(1), v(10)), Some(PortNo(3)));
        // other vlans and switches are distinct
        assert_eq!(table.lookup(SW1, mac(1), v(11)), None);
        assert_eq!(table.lookup(SW2, mac(1), v(10)), None);
        // moving to another port overwrites and reports the old one
        assert_eq!(table.learn(SW1, mac(1), v(10), PortNo(4)), Some(PortNo(3)));
        assert_eq!(table.lookup(SW1, mac(1), v(10)), Some(PortNo(4)));
        assert_eq!(table.entry_count(SW1), 1);
    }

    #[test]
    fn vlan_sentinel_is_untagged() {
        let table = MacTable::default();
        table.learn(SW1, mac(1), v(VlanTag::SENTINEL), PortNo(2));
        assert_eq!(table.lookup(SW1, mac(1), v(0)), Some(PortNo(2)));
        assert_eq!(table.lookup(SW1, mac(1), v(0xffff)), Some(PortNo(2)));

        table.learn(SW1, mac(2), v(0), PortNo(5));
        assert_eq!(table.lookup(SW1, mac(2), v(VlanTag::SENTINEL)), Some(PortNo(5)));
        assert_eq!(table.entries(SW1).len(), 2);
        assert!(table.entries(SW1).iter().all(|e| e.vlan == VlanTag::UNTAGGED));
    }

    #[test]
    #[traced_test]
    fn bounded_per_switch() {
        let table = MacTable::default();
        for n in 0..DEFAULT_CAPACITY as u64 {
            table.learn(SW1, mac(n), v(1), PortNo(1));
        }
        // a different switch does not count against SW1
        table.learn(SW2, mac(0), v(1), PortNo(1));
        assert_eq!(table.entry_count(SW1), DEFAULT_CAPACITY);

        table.learn(SW1, mac(5000), v(1), PortNo(2));
        assert_eq!(table.entry_count(SW1), DEFAULT_CAPACITY);
        // mac(0) was the least recently used
        assert_eq!(table.lookup(SW1, mac(0), v(1)), None);
        for n in 1..DEFAULT_CAPACITY as u64 {
            assert_eq!(table.lookup(SW1, mac(n), v(1)), Some(PortNo(1)), "mac {n}");
        }
        assert_eq!(table.lookup(SW1, mac(5000), v(1)), Some(PortNo(2)));
        assert_eq!(table.lookup(SW2, mac(0), v(1)), Some(PortNo(1)));
        assert!(logs_contain("table full, evicted"));
    }

    #[test]
    fn lookup_refreshes_recency() {
        let table = MacTable::new(2);
        table.learn(SW1, mac(1), v(0), PortNo(1));
        table.learn(SW1, mac(2), v(0), PortNo(2));
        let _ = table.lookup(SW1, mac(1), v(0));
        table.learn(SW1, mac(3), v(0), PortNo(3));
        assert_eq!(table.lookup(SW1, mac(2), v(0)), None);
        assert_eq!(table.lookup(SW1, mac(1), v(0)), Some(PortNo(1)));
    }

    #[test]
    fn forget_and_clear() {
        let table = MacTable::default();
        table.learn(SW1, mac(1), v(0), PortNo(1));
        table.learn(SW1, mac(2), v(0), PortNo(2));
        table.learn(SW2, mac(1), v(0), PortNo(7));

        assert_eq!(table.forget(SW1, mac(1), v(0)), Some(PortNo(1)));
        assert_eq!(table.forget(SW1, mac(1), v(0)), None);
        assert_eq!(table.forget(SwitchId(99), mac(1), v(0)), None);
        assert_eq!(table.lookup(SW1, mac(1), v(0)), None);
        assert_eq!(table.lookup(SW2, mac(1), v(0)), Some(PortNo(7)));

        table.clear_switch(SW1);
        assert_eq!(table.switches(), vec![SW2]);
        assert_eq!(table.lookup(SW1, mac(2), v(0)), None);

        table.clear_all();
        assert!(table.switches().is_empty());
        assert!(table.snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_most_recent_first() {
        let table = MacTable::default();
        table.learn(SW2, mac(1), v(0), PortNo(1));
        table.learn(SW1, mac(1), v(0), PortNo(1));
        table.learn(SW1, mac(2), v(20), PortNo(2));
        let snapshot = table.snapshot();
        assert_eq!(snapshot.keys().copied().collect::<Vec<_>>(), vec![SW1, SW2]);
        assert_eq!(
            snapshot[&SW1],
            vec![
                LearnedEntry {
                    mac: mac(2),
                    vlan: VlanTag::new(20),
                    port: PortNo(2)
                },
                LearnedEntry {
                    mac: mac(1),
                    vlan: VlanTag::UNTAGGED,
                    port: PortNo(1)
                },
            ]
        );
        let yaml = serde_yaml_ng::to_string(&snapshot[&SW2]).unwrap();
        assert!(yaml.contains("vlan: 0"));
        assert!(yaml.contains("port: 1"));
    }

    #[test]
    fn concurrent_switches() {
        let table = MacTable::default();
        std::thread::scope(|s| {
            for sw in 0..4u64 {
                let table = &table;
                s.spawn(move || {
                    for n in 0..1500u64 {
                        table.learn(SwitchId(sw), mac(n), v(0), PortNo(1 + (n % 8) as u16));
                        let _ = table.lookup(SwitchId(sw), mac(n / 2), v(0));
                    }
                });
            }
        });
        for sw in 0..4u64 {
            assert_eq!(table.entry_count(SwitchId(sw)), DEFAULT_CAPACITY);
            let last = table.lookup(SwitchId(sw), mac(1499), v(0));
            assert_eq!(last, Some(PortNo(1 + (1499 % 8))));
        }
    }
}
