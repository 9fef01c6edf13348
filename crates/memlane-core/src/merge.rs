//! Pure merges for incrementally loaded collections.
//!
//! Both merges are `old + incoming → new` and never drop a key. Diary entries
//! only move up in completeness; artifacts take the newest record unless it
//! is strictly less complete than what is already held.

use std::collections::{BTreeMap, HashMap};

use memlane_contracts::{artifact::Artifact, diary::DiaryEntry, Address};

/// Merge diary entries by round. The result is sorted by round.
///
/// An incoming entry replaces the existing one for its round only when it
/// strictly dominates it. When a round has one most complete entry, the final
/// entry does not depend on the order in which pages arrived; on a tie the
/// entry seen first is kept.
pub fn merge_diary_entries(existing: &[DiaryEntry], incoming: &[DiaryEntry]) -> Vec<DiaryEntry> {
    let mut by_round: BTreeMap<u64, DiaryEntry> = BTreeMap::new();
    for entry in existing.iter().chain(incoming) {
        match by_round.get(&entry.round) {
            Some(current) if !entry.dominates(current) => {}
            _ => {
                by_round.insert(entry.round, entry.clone());
            }
        }
    }
    by_round.into_values().collect()
}

/// Merge artifacts by address. The result is sorted by round, then address.
pub fn merge_artifacts(existing: &[Artifact], incoming: &[Artifact]) -> Vec<Artifact> {
    let mut by_address: HashMap<Address, Artifact> = HashMap::new();
    for artifact in existing.iter().chain(incoming) {
        match by_address.get(&artifact.address) {
            Some(current) if artifact.completeness() < current.completeness() => {}
            _ => {
                by_address.insert(artifact.address, artifact.clone());
            }
        }
    }
    let mut merged: Vec<Artifact> = by_address.into_values().collect();
    merged.sort_by(|a, b| a.round.cmp(&b.round).then(a.address.cmp(&b.address)));
    merged
}
