//! Event replay — feeds heartbeats and staging requests into a pool.
//!
//! Input is newline-delimited JSON, one event per line. Blank lines and
//! lines starting with `#` are skipped.
//!
//! ```text
//! {"type":"advertise","payload":{"id":"s1","stacks":["cflinuxfs3"],"available_memory":4096,"available_disk":8192}}
//! {"type":"stage","request_id":"app-1","stack":"cflinuxfs3","memory":1024,"disk":2048,"reserve":true}
//! {"type":"reserve","stager_id":"s1","memory":256}
//! ```
//!
//! A reader task decodes lines and publishes them on an mpsc channel; the
//! dispatch loop owns the pool side and emits one [`Outcome`] per staging
//! or reservation event, plus one per rejected line.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use stagerpool_advert::StagerHeartbeat;
use stagerpool_placement::{Clock, PlacementError, StagerPool};

/// Channel depth between the reader task and the dispatch loop.
const CHANNEL_CAPACITY: usize = 256;

/// One input line.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A stager heartbeat, carried verbatim.
    Advertise { payload: serde_json::Value },
    /// A staging request.
    Stage {
        #[serde(default)]
        request_id: Option<String>,
        stack: String,
        memory: i64,
        disk: i64,
        /// Deduct `memory` from the chosen stager right away.
        #[serde(default)]
        reserve: bool,
    },
    /// An explicit memory reservation.
    Reserve { stager_id: String, memory: i64 },
}

/// Result line written for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Placed {
        request_id: Option<String>,
        stager_id: String,
    },
    NoCapacity {
        request_id: Option<String>,
    },
    StackUnavailable {
        request_id: Option<String>,
        message: String,
    },
    Reserved {
        stager_id: String,
        memory: i64,
    },
    Rejected {
        line: usize,
        reason: String,
    },
}

/// Counters reported when the input is exhausted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub heartbeats: usize,
    pub placed: usize,
    pub no_capacity: usize,
    pub stack_unavailable: usize,
    pub reservations: usize,
    pub rejected: usize,
}

impl ReplaySummary {
    fn count(&mut self, outcome: Option<&Outcome>) {
        match outcome {
            None => self.heartbeats += 1,
            Some(Outcome::Placed { .. }) => self.placed += 1,
            Some(Outcome::NoCapacity { .. }) => self.no_capacity += 1,
            Some(Outcome::StackUnavailable { .. }) => self.stack_unavailable += 1,
            Some(Outcome::Reserved { .. }) => self.reservations += 1,
            Some(Outcome::Rejected { .. }) => self.rejected += 1,
        }
    }
}

enum Inbound {
    Event { line: usize, event: Event },
    Malformed { line: usize, reason: String },
}

/// Apply a single event to the pool.
///
/// Accepted heartbeats produce no outcome.
pub fn dispatch<C: Clock>(pool: &StagerPool<C>, line: usize, event: Event) -> Option<Outcome> {
    match event {
        Event::Advertise { payload } => {
            let recorded = StagerHeartbeat::from_value(payload)
                .map_err(PlacementError::from)
                .and_then(|hb| pool.record_heartbeat(hb));
            match recorded {
                Ok(()) => None,
                Err(e) => {
                    warn!(line, error = %e, "heartbeat rejected");
                    Some(Outcome::Rejected {
                        line,
                        reason: e.to_string(),
                    })
                }
            }
        }
        Event::Stage {
            request_id,
            stack,
            memory,
            disk,
            reserve,
        } => match pool.find_stager(&stack, memory, disk) {
            Ok(Some(stager_id)) => {
                if reserve {
                    if let Err(e) = pool.reserve_app_memory(&stager_id, memory) {
                        warn!(%stager_id, error = %e, "reservation after placement failed");
                    }
                }
                Some(Outcome::Placed {
                    request_id,
                    stager_id,
                })
            }
            Ok(None) => Some(Outcome::NoCapacity { request_id }),
            Err(e @ PlacementError::StackUnavailable(_)) => Some(Outcome::StackUnavailable {
                request_id,
                message: e.to_string(),
            }),
            Err(e) => Some(Outcome::Rejected {
                line,
                reason: e.to_string(),
            }),
        },
        Event::Reserve { stager_id, memory } => {
            match pool.reserve_app_memory(&stager_id, memory) {
                Ok(()) => Some(Outcome::Reserved { stager_id, memory }),
                Err(e) => Some(Outcome::Rejected {
                    line,
                    reason: e.to_string(),
                }),
            }
        }
    }
}

/// Read every event from `input`, apply it to `pool` and hand each outcome
/// to `emit`.
pub async fn run<R, C, F>(pool: &StagerPool<C>, input: R, mut emit: F) -> anyhow::Result<ReplaySummary>
where
    R: AsyncRead + Unpin + Send + 'static,
    C: Clock,
    F: FnMut(&Outcome) -> anyhow::Result<()>,
{
    let (tx, mut rx) = mpsc::channel::<Inbound>(CHANNEL_CAPACITY);

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(input).lines();
        let mut line_no = 0usize;
        while let Some(raw) = lines.next_line().await? {
            line_no += 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let inbound = match serde_json::from_str::<Event>(trimmed) {
                Ok(event) => Inbound::Event {
                    line: line_no,
                    event,
                },
                Err(e) => Inbound::Malformed {
                    line: line_no,
                    reason: e.to_string(),
                },
            };
            if tx.send(inbound).await.is_err() {
                break;
            }
        }
        debug!(lines = line_no, "input exhausted");
        Ok::<(), std::io::Error>(())
    });

    let mut summary = ReplaySummary::default();
    while let Some(inbound) = rx.recv().await {
        let outcome = match inbound {
            Inbound::Event { line, event } => dispatch(pool, line, event),
            Inbound::Malformed { line, reason } => {
                warn!(line, %reason, "skipping malformed event");
                Some(Outcome::Rejected { line, reason })
            }
        };
        summary.count(outcome.as_ref());
        if let Some(outcome) = &outcome {
            emit(outcome)?;
        }
    }

    reader.await??;

    info!(
        heartbeats = summary.heartbeats,
        placed = summary.placed,
        no_capacity = summary.no_capacity,
        stack_unavailable = summary.stack_unavailable,
        reservations = summary.reservations,
        rejected = summary.rejected,
        stagers = pool.len(),
        "replay finished"
    );
    Ok(summary)
}
