//! List reconciler
//!
//! Computes the minimal set of row changes between two snapshots of the timer
//! collection. Identity is the timer id; content is `(remaining_ms,
//! is_running)`. Snapshots are expected to hold unique ids, which the store
//! guarantees.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::state::{TimerId, TimerRecord};

/// Which tracked fields differ for a content-changed row.
///
/// Lets the rendering layer apply a partial refresh instead of a full rebind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangePayload {
    pub remaining_changed: bool,
    pub running_changed: bool,
}

impl ChangePayload {
    fn between(old: &TimerRecord, new: &TimerRecord) -> Option<Self> {
        if old.same_content(new) {
            return None;
        }
        Some(Self {
            remaining_changed: old.remaining_ms != new.remaining_ms,
            running_changed: old.is_running != new.is_running,
        })
    }
}

/// Per-id outcome of reconciling two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RowChange {
    Unchanged { id: TimerId, position: usize },
    Updated { id: TimerId, position: usize, payload: ChangePayload },
    Inserted { id: TimerId, position: usize },
    Moved { id: TimerId, from: usize, to: usize, payload: Option<ChangePayload> },
    /// `position` is the row's index in the old snapshot
    Removed { id: TimerId, position: usize },
}

impl RowChange {
    pub fn id(&self) -> TimerId {
        match *self {
            RowChange::Unchanged { id, .. }
            | RowChange::Updated { id, .. }
            | RowChange::Inserted { id, .. }
            | RowChange::Moved { id, .. }
            | RowChange::Removed { id, .. } => id,
        }
    }

    /// Whether the change alters the row structure rather than a row's content
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            RowChange::Inserted { .. } | RowChange::Moved { .. } | RowChange::Removed { .. }
        )
    }
}

/// Diff `old` against `new`.
///
/// Removals come first, in old order. Then every row of `new` gets exactly
/// one entry in new order. Rows whose old positions form the longest
/// increasing run keep their place; only the others are reported as moved.
pub fn diff(old: &[TimerRecord], new: &[TimerRecord]) -> Vec<RowChange> {
    let old_index: HashMap<TimerId, usize> =
        old.iter().enumerate().map(|(i, record)| (record.id, i)).collect();
    let new_ids: HashSet<TimerId> = new.iter().map(|record| record.id).collect();

    let mut changes: Vec<RowChange> = old
        .iter()
        .enumerate()
        .filter(|(_, record)| !new_ids.contains(&record.id))
        .map(|(position, record)| RowChange::Removed { id: record.id, position })
        .collect();

    let retained: Vec<usize> = new
        .iter()
        .filter_map(|record| old_index.get(&record.id).copied())
        .collect();
    let stable: HashSet<usize> = longest_increasing_run(&retained)
        .into_iter()
        .map(|i| retained[i])
        .collect();

    for (position, record) in new.iter().enumerate() {
        let change = match old_index.get(&record.id) {
            None => RowChange::Inserted { id: record.id, position },
            Some(&from) => {
                let payload = ChangePayload::between(&old[from], record);
                if !stable.contains(&from) {
                    RowChange::Moved { id: record.id, from, to: position, payload }
                } else if let Some(payload) = payload {
                    RowChange::Updated { id: record.id, position, payload }
                } else {
                    RowChange::Unchanged { id: record.id, position }
                }
            }
        };
        changes.push(change);
    }
    changes
}

/// Indices into `values` of one longest strictly increasing subsequence
fn longest_increasing_run(values: &[usize]) -> Vec<usize> {
    // tails[k]: index of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (i, &value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&t| values[t] < value);
        if slot > 0 {
            previous[i] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(i);
        } else {
            tails[slot] = i;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        run.push(i);
        cursor = previous[i];
    }
    run.reverse();
    run
}
