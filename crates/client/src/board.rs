//! Local copy of the scheduling grid's allocations.
//!
//! Drag-and-drop moves are applied to the copy first so the grid reacts
//! immediately. When the store rejects the write, the single affected row
//! is re-read and the copy reconciled to whatever the store holds.

use agendas_core::allocation::{apply_move, Allocation};
use agendas_core::schedule::{resolve_cell, Cell};
use agendas_core::types::{DbId, Day};

use crate::error::ClientError;
use crate::store::AllocationStore;

/// In-memory allocations backing one grid view.
///
/// A plain owned value: callers serialize access through `&mut self`, and
/// dropping the board discards any result still in flight.
#[derive(Debug, Clone, Default)]
pub struct ScheduleBoard {
    allocations: Vec<Allocation>,
}

impl ScheduleBoard {
    pub fn new(allocations: Vec<Allocation>) -> Self {
        Self { allocations }
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn get(&self, id: DbId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    /// Replace the whole copy, e.g. after navigating to another period.
    pub fn replace_all(&mut self, allocations: Vec<Allocation>) {
        self.allocations = allocations;
    }

    /// Cell contents for one consultant and day.
    pub fn cell(&self, consultant_id: DbId, date: Day) -> Vec<Cell> {
        resolve_cell(&self.allocations, consultant_id, date)
    }

    /// Move an allocation to `target`, optimistically.
    ///
    /// On a failed write the row is re-read from `store`: it is reconciled
    /// to the stored version, or dropped if the store no longer has it. If
    /// the re-read fails too, the pre-move row is restored. The write error
    /// is returned in every failure case.
    pub async fn move_allocation<S>(
        &mut self,
        store: &S,
        id: DbId,
        target: Day,
    ) -> Result<(), ClientError>
    where
        S: AllocationStore + ?Sized,
    {
        let previous = self.get(id).cloned();
        apply_move(&mut self.allocations, id, target);

        match store.move_allocation(id, target).await {
            Ok(stored) => {
                self.upsert(stored);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(allocation_id = id, %target, error = %err, "Move failed, re-reading");
                match store.fetch_allocation(id).await {
                    Ok(Some(stored)) => self.upsert(stored),
                    Ok(None) => self.remove(id),
                    Err(reread) => {
                        tracing::warn!(allocation_id = id, error = %reread, "Re-read failed");
                        match previous {
                            Some(row) => self.upsert(row),
                            None => self.remove(id),
                        }
                    }
                }
                Err(err)
            }
        }
    }

    fn upsert(&mut self, row: Allocation) {
        match self.allocations.iter_mut().find(|a| a.id == row.id) {
            Some(slot) => *slot = row,
            None => self.allocations.push(row),
        }
    }

    fn remove(&mut self, id: DbId) {
        self.allocations.retain(|a| a.id != id);
    }
}
