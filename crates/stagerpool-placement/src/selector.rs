//! Top-N stager ranking and sampling.
//!
//! Feasible stagers are ranked by available memory and one of the `N`
//! roomiest is picked uniformly at random. Always taking the single best
//! stager would send every concurrent request to the same place until its
//! next heartbeat arrives.
//!
//! `N` scales with fleet size:
//!
//! ```text
//! N = max(MIN_TOP_STAGERS, floor(top_stager_percentage / 100 * fleet_size))
//! ```
//!
//! where `fleet_size` counts live advertisements before the feasibility
//! filter.

use std::cmp::Ordering;

use rand::Rng;
use rand::seq::SliceRandom;

use stagerpool_advert::Advertisement;

/// Lower bound on the selection window.
pub const MIN_TOP_STAGERS: usize = 5;

/// Size of the selection window for a fleet of `fleet_size` stagers.
pub fn window_size(top_stager_percentage: u32, fleet_size: usize) -> usize {
    let scaled = fleet_size.saturating_mul(top_stager_percentage as usize) / 100;
    scaled.max(MIN_TOP_STAGERS)
}

/// Ascending by available memory, ties by stager id.
fn by_available_memory(a: &&Advertisement, b: &&Advertisement) -> Ordering {
    a.available_memory
        .cmp(&b.available_memory)
        .then_with(|| a.stager_id.cmp(&b.stager_id))
}

/// Keep the `n` candidates with the most available memory.
///
/// The returned window is sorted ascending, so the roomiest stager is last.
pub fn top_n(mut candidates: Vec<&Advertisement>, n: usize) -> Vec<&Advertisement> {
    candidates.sort_by(by_available_memory);
    let start = candidates.len().saturating_sub(n);
    candidates.split_off(start)
}

/// Pick one entry of `window` uniformly at random.
pub fn sample<'a, R: Rng + ?Sized>(
    window: &[&'a Advertisement],
    rng: &mut R,
) -> Option<&'a Advertisement> {
    window.choose(rng).copied()
}
