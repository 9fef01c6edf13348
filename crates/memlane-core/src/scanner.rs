//! The round scanner: a bounded linear search over `(round, slot)` pairs.
//!
//! Slot occupancy is neither monotonic nor predictable, so the scanner walks
//! rounds in batches and stops as soon as one of these holds:
//!
//! 1. the accumulated result count reaches `target`,
//! 2. `max_batches` batches have been probed,
//! 3. the next round would exceed `current_round_bound`.
//!
//! Rounds inside a batch are probed concurrently. Slots inside a round are
//! probed sequentially from 0 until the probe reports `Exhausted`, fails, or
//! the per-round slot cap is reached. Round 0 is never probed.

use futures::future::join_all;
use tracing::{debug, warn};

use memlane_contracts::scan::{ScanCursor, ScanOptions, ScanPage, SlotOutcome};

use crate::traits::RoundProbe;

/// Scan from `start_round` (clamped to at least 1) up to `current_round_bound`.
pub async fn scan_rounds<P>(
    probe: &P,
    start_round: u64,
    current_round_bound: u64,
    options: &ScanOptions,
) -> ScanPage<P::Item>
where
    P: RoundProbe + ?Sized,
{
    let start = start_round.max(1);
    let batch_size = options.batch_size.max(1);
    let max_batches = options.max_batches.max(1);

    let mut items = Vec::new();
    let mut end = start - 1;
    let mut batches = 0u32;

    while batches < max_batches && end < current_round_bound {
        let batch_start = end + 1;
        let batch_end = batch_start
            .saturating_add(batch_size - 1)
            .min(current_round_bound);

        debug!(batch_start, batch_end, batch = batches, "probing round batch");
        let rounds = (batch_start..=batch_end).map(|round| scan_round(probe, round, options));
        for found in join_all(rounds).await {
            items.extend(found);
        }

        end = batch_end;
        batches += 1;

        if items.len() >= options.target {
            debug!(found = items.len(), target = options.target, "scan target reached");
            break;
        }
    }

    ScanPage {
        items,
        cursor: ScanCursor {
            start_round: start,
            end_round: end,
            current_round_bound,
        },
    }
}

/// Resume a scan from `cursor.end_round + 1` with the same options.
///
/// Returns an empty page with an unchanged cursor once the bound is reached.
pub async fn continue_scan<P>(probe: &P, cursor: &ScanCursor, options: &ScanOptions) -> ScanPage<P::Item>
where
    P: RoundProbe + ?Sized,
{
    if !cursor.has_more() {
        return ScanPage {
            items: Vec::new(),
            cursor: *cursor,
        };
    }
    scan_rounds(probe, cursor.next_round(), cursor.current_round_bound, options).await
}

async fn scan_round<P>(probe: &P, round: u64, options: &ScanOptions) -> Vec<P::Item>
where
    P: RoundProbe + ?Sized,
{
    let cap = probe
        .slots_per_round()
        .unwrap_or(options.max_slots_per_round)
        .min(options.max_slots_per_round.max(1));

    let mut found = Vec::new();
    for slot in 0..cap {
        match probe.probe(round, slot).await {
            Ok(SlotOutcome::Found(item)) => found.push(item),
            Ok(SlotOutcome::Hole) => {
                debug!(round, slot, "empty slot, continuing");
            }
            Ok(SlotOutcome::Exhausted) => break,
            Err(e) => {
                warn!(round, slot, error = %e, "probe failed, skipping rest of round");
                break;
            }
        }
    }
    found
}
