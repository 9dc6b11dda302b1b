//! Rendering-layer list model
//!
//! Applies reconciler output to a list of rows. Inserted rows get a full
//! bind, content-changed rows a partial refresh; rows the diff reports as
//! unchanged or moved are carried over untouched. The view only reads
//! records, it never mutates timer state.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::{TimerId, TimerRecord};
use crate::engine::{diff, RowChange};

/// One rendered row
#[derive(Debug, Clone, Serialize)]
pub struct RowView {
    pub record: TimerRecord,
    /// Full binds since the row was created
    pub binds: u32,
    /// Partial refreshes applied through a change payload
    pub refreshes: u32,
}

#[derive(Debug, Default)]
pub struct ListView {
    rows: Vec<RowView>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile against `snapshot` and apply the result
    pub fn submit(&mut self, snapshot: &[TimerRecord]) -> Vec<RowChange> {
        let previous: Vec<TimerRecord> = self.rows.iter().map(|row| row.record.clone()).collect();
        let changes = diff(&previous, snapshot);

        let mut old_rows: HashMap<TimerId, RowView> =
            self.rows.drain(..).map(|row| (row.record.id, row)).collect();
        let by_id: HashMap<TimerId, &TimerRecord> =
            snapshot.iter().map(|record| (record.id, record)).collect();

        for change in &changes {
            let id = change.id();
            let Some(&record) = by_id.get(&id) else {
                debug!("Row {} removed", id);
                continue;
            };
            let row = match change {
                RowChange::Inserted { .. } => RowView { record: record.clone(), binds: 1, refreshes: 0 },
                RowChange::Updated { .. } | RowChange::Moved { payload: Some(_), .. } => {
                    let mut row = take_row(&mut old_rows, record);
                    row.record = record.clone();
                    row.refreshes += 1;
                    row
                }
                _ => {
                    let mut row = take_row(&mut old_rows, record);
                    row.record = record.clone();
                    row
                }
            };
            self.rows.push(row);
        }
        changes
    }

    /// Mark a row as fully rebound, e.g. after the client returns to the foreground
    pub fn rebind(&mut self, id: TimerId) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.record.id == id) {
            row.binds += 1;
        }
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn row(&self, id: TimerId) -> Option<&RowView> {
        self.rows.iter().find(|row| row.record.id == id)
    }
}

fn take_row(old_rows: &mut HashMap<TimerId, RowView>, record: &TimerRecord) -> RowView {
    old_rows
        .remove(&record.id)
        .unwrap_or_else(|| RowView { record: record.clone(), binds: 1, refreshes: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TimerStore;

    #[test]
    fn unrelated_rows_are_not_redrawn() {
        let mut store = TimerStore::new();
        let mut view = ListView::new();
        for _ in 0..3 {
            store.add(60_000).unwrap();
            view.submit(&store.snapshot());
        }

        store.start(1, 0);
        view.submit(&store.snapshot());
        store.stop(1, 42_000);
        view.submit(&store.snapshot());

        assert_eq!(view.row(1).unwrap().refreshes, 2);
        assert_eq!(view.row(1).unwrap().record.remaining_ms, 42_000);
        for id in [0, 2] {
            let row = view.row(id).unwrap();
            assert_eq!((row.binds, row.refreshes), (1, 0));
        }
    }

    #[test]
    fn removed_rows_disappear_and_order_follows_snapshot() {
        let mut store = TimerStore::new();
        let mut view = ListView::new();
        for _ in 0..3 {
            store.add(1_000).unwrap();
        }
        view.submit(&store.snapshot());
        store.delete(1);
        let changes = view.submit(&store.snapshot());

        assert_eq!(changes[0], RowChange::Removed { id: 1, position: 1 });
        let ids: Vec<_> = view.rows().iter().map(|row| row.record.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn rebind_counts_full_binds() {
        let mut store = TimerStore::new();
        let mut view = ListView::new();
        store.add(1_000).unwrap();
        view.submit(&store.snapshot());
        view.rebind(0);
        view.rebind(5);
        assert_eq!(view.row(0).unwrap().binds, 2);
    }
}
