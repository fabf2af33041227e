//! R1 key holder store.
//!
//! Cache of PMK-R1 material pushed down from the R0 key holder, keyed by
//! the PMK-R1 name. Capacity-bounded; the maintenance sweep counts key
//! lifetimes down and reports each expiry exactly once so the owner can
//! disassociate the station.

use std::collections::HashMap;

use roamkey_crypto::PmkR1;
use roamkey_proto::{MacAddr, SuiteSelector};

/// One cached R1 key and the association context it was issued for.
pub struct R1KeyEntry {
    /// The PMK-R1 itself.
    pub pmk_r1: PmkR1,
    /// Name of the PMK-R1; the store key.
    pub pmk_r1_name: [u8; 16],
    /// Name of the parent PMK-R0.
    pub pmk_r0_name: [u8; 16],
    /// R0 key holder that issued this key.
    pub r0kh_id: Vec<u8>,
    /// AKM suite the key was established under.
    pub akm: SuiteSelector,
    /// Pairwise cipher negotiated at the initial association.
    pub pairwise_cipher: SuiteSelector,
    /// Station the key belongs to.
    pub sta_mac: MacAddr,
    /// Remaining lifetime in maintenance ticks.
    pub key_lifetime: u32,
    /// Ticks left for the station to complete its reassociation.
    pub reassoc_deadline: u32,
}

/// Capacity-bounded PMK-R1 cache.
pub struct R1KeyStore {
    entries: HashMap<[u8; 16], R1KeyEntry>,
    capacity: usize,
}

impl R1KeyStore {
    /// Create a store holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity), capacity }
    }

    /// Insert or replace an entry.
    ///
    /// Returns `false` when the store is full and the name is new; replacing
    /// an existing name always succeeds.
    pub fn insert(&mut self, entry: R1KeyEntry) -> bool {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&entry.pmk_r1_name) {
            return false;
        }
        self.entries.insert(entry.pmk_r1_name, entry);
        true
    }

    /// Entry for the given PMK-R1 name, if cached.
    pub fn lookup(&self, pmk_r1_name: &[u8; 16]) -> Option<&R1KeyEntry> {
        self.entries.get(pmk_r1_name)
    }

    /// Remove an entry. Idempotent.
    pub fn remove(&mut self, pmk_r1_name: &[u8; 16]) -> bool {
        self.entries.remove(pmk_r1_name).is_some()
    }

    /// Reset an entry's reassociation deadline.
    pub fn refresh_reassoc_deadline(&mut self, pmk_r1_name: &[u8; 16], ticks: u32) -> bool {
        match self.entries.get_mut(pmk_r1_name) {
            Some(entry) => {
                entry.reassoc_deadline = ticks;
                true
            },
            None => false,
        }
    }

    /// One maintenance tick: count every lifetime down and evict expired
    /// keys, reporting each evicted station once.
    pub fn sweep(&mut self, mut on_expired: impl FnMut(MacAddr)) {
        let expired: Vec<[u8; 16]> = self
            .entries
            .values_mut()
            .filter_map(|entry| {
                entry.key_lifetime = entry.key_lifetime.saturating_sub(1);
                (entry.key_lifetime == 0).then_some(entry.pmk_r1_name)
            })
            .collect();
        for name in expired {
            if let Some(entry) = self.entries.remove(&name) {
                on_expired(entry.sta_mac);
            }
        }
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name_fill: u8, lifetime: u32) -> R1KeyEntry {
        R1KeyEntry {
            pmk_r1: PmkR1::from_bytes([0x42; 32]),
            pmk_r1_name: [name_fill; 16],
            pmk_r0_name: [0x24; 16],
            r0kh_id: b"r0kh.example".to_vec(),
            akm: [0x00, 0x0F, 0xAC, 4],
            pairwise_cipher: [0x00, 0x0F, 0xAC, 4],
            sta_mac: MacAddr([name_fill, 0, 0, 0, 0, 1]),
            key_lifetime: lifetime,
            reassoc_deadline: 10,
        }
    }

    #[test]
    fn insert_then_lookup() {
        let mut store = R1KeyStore::new(4);
        assert!(store.insert(entry(1, 100)));
        let found = store.lookup(&[1; 16]).unwrap();
        assert_eq!(found.sta_mac, MacAddr([1, 0, 0, 0, 0, 1]));
        assert!(store.lookup(&[2; 16]).is_none());
    }

    #[test]
    fn capacity_is_enforced_for_new_names() {
        let mut store = R1KeyStore::new(2);
        assert!(store.insert(entry(1, 100)));
        assert!(store.insert(entry(2, 100)));
        assert!(!store.insert(entry(3, 100)), "store at capacity must refuse a new name");
        // Replacing a cached name still works
        assert!(store.insert(entry(2, 50)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = R1KeyStore::new(4);
        store.insert(entry(1, 100));
        assert!(store.remove(&[1; 16]));
        assert!(!store.remove(&[1; 16]));
        assert!(store.is_empty());
    }

    #[test]
    fn sweep_counts_down_and_evicts_once() {
        let mut store = R1KeyStore::new(4);
        store.insert(entry(1, 2));
        store.insert(entry(2, 5));

        let mut expired = Vec::new();
        store.sweep(|mac| expired.push(mac));
        assert!(expired.is_empty());
        assert_eq!(store.len(), 2);

        store.sweep(|mac| expired.push(mac));
        assert_eq!(expired, vec![MacAddr([1, 0, 0, 0, 0, 1])]);
        assert_eq!(store.len(), 1, "expired entry must be gone");

        // The evicted entry never fires again
        store.sweep(|mac| expired.push(mac));
        assert_eq!(expired.len(), 1);
    }

    proptest::proptest! {
        #[test]
        fn len_never_exceeds_capacity(
            names in proptest::collection::vec(0u8..8, 0..64),
            capacity in 1usize..6,
        ) {
            let mut store = R1KeyStore::new(capacity);
            for name in names {
                let _ = store.insert(entry(name, 100));
                assert!(store.len() <= capacity);
            }
        }
    }

    #[test]
    fn refresh_reassoc_deadline() {
        let mut store = R1KeyStore::new(4);
        store.insert(entry(1, 100));
        assert!(store.refresh_reassoc_deadline(&[1; 16], 30));
        assert_eq!(store.lookup(&[1; 16]).unwrap().reassoc_deadline, 30);
        assert!(!store.refresh_reassoc_deadline(&[9; 16], 30));
    }
}
