//! Advertisement table.
//!
//! Plain map keyed by stager id. Not synchronized on its own: the pool
//! owns it behind a mutex and every method here runs inside that critical
//! section.

use std::collections::HashMap;

use stagerpool_advert::{Advertisement, StagerId};

#[derive(Debug, Default)]
pub(crate) struct AdvertisementTable {
    ads: HashMap<StagerId, Advertisement>,
}

impl AdvertisementTable {
    /// Insert or fully replace the snapshot for `ad.stager_id`.
    pub(crate) fn upsert(&mut self, ad: Advertisement) -> Option<Advertisement> {
        self.ads.insert(ad.stager_id.clone(), ad)
    }

    /// Remove every advertisement with `expires_at <= now`.
    ///
    /// Returns the removed stager ids.
    pub(crate) fn prune(&mut self, now: u64) -> Vec<StagerId> {
        let expired: Vec<StagerId> = self
            .ads
            .values()
            .filter(|ad| ad.is_expired(now))
            .map(|ad| ad.stager_id.clone())
            .collect();

        for id in &expired {
            self.ads.remove(id);
        }
        expired
    }

    /// Whether any entry lists `stack`, ignoring capacity and expiry.
    pub(crate) fn any_with_stack(&self, stack: &str) -> bool {
        self.ads.values().any(|ad| ad.has_stack(stack))
    }

    /// Entries that can take a `(stack, memory, disk)` request right now.
    pub(crate) fn feasible(&self, stack: &str, memory: i64, disk: i64) -> Vec<&Advertisement> {
        self.ads
            .values()
            .filter(|ad| ad.meets_needs(memory, stack) && ad.has_sufficient_disk(disk))
            .collect()
    }

    pub(crate) fn get_mut(&mut self, stager_id: &str) -> Option<&mut Advertisement> {
        self.ads.get_mut(stager_id)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &Advertisement> {
        self.ads.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.ads.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(id: &str, memory: i64, disk: i64, stacks: &[&str], expires_at: u64) -> Advertisement {
        Advertisement {
            stager_id: id.to_string(),
            available_memory: memory,
            available_disk: disk,
            stacks: stacks.iter().map(|s| s.to_string()).collect(),
            expires_at,
        }
    }

    #[test]
    fn upsert_replaces_whole_snapshot() {
        let mut table = AdvertisementTable::default();
        assert!(table.upsert(ad("s1", 1024, 4096, &["a", "b"], 10)).is_none());

        let previous = table.upsert(ad("s1", 512, 1024, &["c"], 20)).unwrap();
        assert_eq!(previous.available_memory, 1024);

        assert_eq!(table.len(), 1);
        let current = table.values().next().unwrap();
        assert_eq!(current.available_memory, 512);
        assert_eq!(current.available_disk, 1024);
        assert!(!current.has_stack("a"));
        assert!(current.has_stack("c"));
        assert_eq!(current.expires_at, 20);
    }

    #[test]
    fn prune_removes_expired_at_boundary() {
        let mut table = AdvertisementTable::default();
        table.upsert(ad("old", 1, 1, &["a"], 10));
        table.upsert(ad("edge", 1, 1, &["a"], 15));
        table.upsert(ad("fresh", 1, 1, &["a"], 16));

        let mut removed = table.prune(15);
        removed.sort();
        assert_eq!(removed, vec!["edge".to_string(), "old".to_string()]);
        assert_eq!(table.len(), 1);
        assert!(table.get_mut("fresh").is_some());
    }

    #[test]
    fn any_with_stack_ignores_capacity_and_expiry() {
        let mut table = AdvertisementTable::default();
        table.upsert(ad("s1", 0, 0, &["cflinuxfs3"], 0));

        assert!(table.any_with_stack("cflinuxfs3"));
        assert!(!table.any_with_stack("cflinuxfs4"));
    }

    #[test]
    fn feasible_applies_all_constraints() {
        let mut table = AdvertisementTable::default();
        table.upsert(ad("fits", 1024, 1024, &["x"], 100));
        table.upsert(ad("low-mem", 100, 1024, &["x"], 100));
        table.upsert(ad("low-disk", 1024, 100, &["x"], 100));
        table.upsert(ad("wrong-stack", 1024, 1024, &["y"], 100));

        let ids: Vec<&str> = table
            .feasible("x", 512, 512)
            .into_iter()
            .map(|a| a.stager_id.as_str())
            .collect();
        assert_eq!(ids, vec!["fits"]);
    }

    #[test]
    fn get_mut_unknown_is_none() {
        let mut table = AdvertisementTable::default();
        assert!(table.get_mut("missing").is_none());
    }
}
