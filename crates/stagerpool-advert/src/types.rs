//! Advertisement model.
//!
//! An [`Advertisement`] is the most recent capacity snapshot a stager
//! reported. Snapshots are replaced wholesale on every heartbeat; the only
//! in-place mutation is [`Advertisement::decrement_memory`], which tracks
//! work placed on the stager until its next heartbeat corrects the number.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Unique identifier for a stager.
pub type StagerId = String;

/// Capacity snapshot for a single stager.
///
/// Memory and disk are in megabytes, the same unit placement requests use.
/// Both are signed: accounting may drive `available_memory` below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Advertisement {
    pub stager_id: StagerId,
    pub available_memory: i64,
    pub available_disk: i64,
    /// Stack identifiers this stager can stage against.
    pub stacks: BTreeSet<String>,
    /// Unix timestamp (seconds, UTC) after which the snapshot is stale.
    pub expires_at: u64,
}

impl Advertisement {
    pub fn has_stack(&self, stack: &str) -> bool {
        self.stacks.contains(stack)
    }

    pub fn has_sufficient_memory(&self, memory: i64) -> bool {
        self.available_memory >= memory
    }

    pub fn has_sufficient_disk(&self, disk: i64) -> bool {
        self.available_disk >= disk
    }

    /// Stack and memory constraints together. Disk is checked separately.
    pub fn meets_needs(&self, memory: i64, stack: &str) -> bool {
        self.has_stack(stack) && self.has_sufficient_memory(memory)
    }

    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    /// Subtract placed memory. Not clamped at zero.
    pub fn decrement_memory(&mut self, amount: i64) {
        self.available_memory = self.available_memory.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(memory: i64, disk: i64, stacks: &[&str]) -> Advertisement {
        Advertisement {
            stager_id: "stager-1".to_string(),
            available_memory: memory,
            available_disk: disk,
            stacks: stacks.iter().map(|s| s.to_string()).collect(),
            expires_at: 100,
        }
    }

    #[test]
    fn has_stack_matches_exact_name() {
        let a = ad(1024, 1024, &["cflinuxfs3"]);
        assert!(a.has_stack("cflinuxfs3"));
        assert!(!a.has_stack("cflinuxfs4"));
        assert!(!a.has_stack("cflinux"));
    }

    #[test]
    fn capacity_checks_are_inclusive() {
        let a = ad(1024, 2048, &["cflinuxfs3"]);
        assert!(a.has_sufficient_memory(1024));
        assert!(!a.has_sufficient_memory(1025));
        assert!(a.has_sufficient_disk(2048));
        assert!(!a.has_sufficient_disk(2049));
    }

    #[test]
    fn meets_needs_requires_stack_and_memory() {
        let a = ad(512, 0, &["cflinuxfs3"]);
        assert!(a.meets_needs(256, "cflinuxfs3"));
        assert!(!a.meets_needs(1024, "cflinuxfs3"));
        assert!(!a.meets_needs(256, "windows"));
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let a = ad(0, 0, &[]);
        assert!(!a.is_expired(99));
        assert!(a.is_expired(100));
        assert!(a.is_expired(101));
    }

    #[test]
    fn decrement_memory_goes_negative() {
        let mut a = ad(256, 0, &["cflinuxfs3"]);
        a.decrement_memory(200);
        assert_eq!(a.available_memory, 56);
        a.decrement_memory(100);
        assert_eq!(a.available_memory, -44);
        assert_eq!(a.available_disk, 0);
    }
}
