//! Stager pool — the shared advertisement table and its operations.
//!
//! Every public operation takes the table lock for its whole duration, so
//! a selection pass never sees a heartbeat half-applied, concurrent passes
//! serialize on pruning and ranking, and memory reservations cannot be
//! lost to a racing heartbeat.

use std::sync::{Mutex, MutexGuard};

use rand::Rng;
use tracing::{debug, warn};

use stagerpool_advert::{Advertisement, StagerHeartbeat, StagerId};

use crate::clock::{Clock, SystemClock};
use crate::config::PoolConfig;
use crate::error::{PlacementError, PlacementResult};
use crate::selector::{sample, top_n, window_size};
use crate::store::AdvertisementTable;

/// Tracks stager advertisements and picks a stager for each staging request.
///
/// `StagerPool` is `Send + Sync`; share it behind an `Arc` between the
/// heartbeat subscriber and the placement path.
pub struct StagerPool<C = SystemClock> {
    config: PoolConfig,
    clock: C,
    table: Mutex<AdvertisementTable>,
}

impl StagerPool<SystemClock> {
    /// Create a pool driven by the system wall clock.
    pub fn new(config: PoolConfig) -> PlacementResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> StagerPool<C> {
    /// Create a pool with an explicit clock.
    pub fn with_clock(config: PoolConfig, clock: C) -> PlacementResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            table: Mutex::new(AdvertisementTable::default()),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Decode a raw heartbeat payload and record it.
    ///
    /// A malformed payload is rejected without touching the table.
    pub fn record(&self, raw: &[u8]) -> PlacementResult<()> {
        let heartbeat = StagerHeartbeat::from_slice(raw).inspect_err(|e| {
            warn!(error = %e, "dropping malformed stager heartbeat");
        })?;
        self.record_heartbeat(heartbeat)
    }

    /// Record an already-decoded heartbeat, replacing any previous snapshot.
    pub fn record_heartbeat(&self, heartbeat: StagerHeartbeat) -> PlacementResult<()> {
        heartbeat.validate()?;
        let expires_at = self
            .clock
            .now_secs()
            .saturating_add(self.config.advertisement_timeout_secs);
        let ad = heartbeat.into_advertisement(expires_at);

        let stager_id = ad.stager_id.clone();
        let memory = ad.available_memory;
        let disk = ad.available_disk;

        let replaced = self.lock().upsert(ad).is_some();
        debug!(%stager_id, memory, disk, expires_at, replaced, "stager advertisement recorded");
        Ok(())
    }

    /// Pick a stager for a `(stack, memory, disk)` request.
    ///
    /// Returns `Ok(None)` when the stack exists but nothing currently fits,
    /// and [`PlacementError::StackUnavailable`] when no advertisement at all
    /// lists the stack.
    pub fn find_stager(
        &self,
        stack: &str,
        memory: i64,
        disk: i64,
    ) -> PlacementResult<Option<StagerId>> {
        self.find_stager_with_rng(stack, memory, disk, &mut rand::thread_rng())
    }

    /// [`find_stager`](Self::find_stager) with a caller-supplied RNG.
    pub fn find_stager_with_rng<R: Rng + ?Sized>(
        &self,
        stack: &str,
        memory: i64,
        disk: i64,
        rng: &mut R,
    ) -> PlacementResult<Option<StagerId>> {
        let mut table = self.lock();

        // Checked before pruning: a stack whose stagers just went quiet is
        // still a known stack.
        if !table.any_with_stack(stack) {
            warn!(%stack, "no stager advertises the requested stack");
            return Err(PlacementError::StackUnavailable(stack.to_string()));
        }

        let pruned = table.prune(self.clock.now_secs());
        if !pruned.is_empty() {
            debug!(count = pruned.len(), stagers = ?pruned, "pruned stale advertisements");
        }

        let fleet_size = table.len();
        let n = window_size(self.config.top_stager_percentage, fleet_size);
        let window = top_n(table.feasible(stack, memory, disk), n);

        let chosen = sample(&window, rng).map(|ad| ad.stager_id.clone());
        match &chosen {
            Some(stager_id) => debug!(
                %stack,
                memory,
                disk,
                %stager_id,
                window = window.len(),
                fleet_size,
                "stager selected"
            ),
            None => debug!(%stack, memory, disk, fleet_size, "no stager has capacity"),
        }
        Ok(chosen)
    }

    /// Deduct `amount` from a stager's tracked memory until its next heartbeat.
    ///
    /// Fails with [`PlacementError::StagerNotFound`] if the stager has no
    /// advertisement, which includes one pruned by an earlier selection.
    pub fn reserve_app_memory(&self, stager_id: &str, amount: i64) -> PlacementResult<()> {
        let mut table = self.lock();
        match table.get_mut(stager_id) {
            Some(ad) => {
                ad.decrement_memory(amount);
                debug!(%stager_id, amount, remaining = ad.available_memory, "reserved stager memory");
                Ok(())
            }
            None => {
                warn!(%stager_id, amount, "memory reservation for unknown stager");
                Err(PlacementError::StagerNotFound(stager_id.to_string()))
            }
        }
    }

    /// Snapshot of every stored advertisement, sorted by stager id.
    ///
    /// Expired entries that no selection has pruned yet are included.
    pub fn advertisements(&self) -> Vec<Advertisement> {
        let mut ads: Vec<Advertisement> = self.lock().values().cloned().collect();
        ads.sort_by(|a, b| a.stager_id.cmp(&b.stager_id));
        ads
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, AdvertisementTable> {
        self.table.lock().expect("advertisement table lock")
    }
}
