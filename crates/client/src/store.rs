//! The persistence seam the schedule board writes through.

use agendas_core::allocation::Allocation;
use agendas_core::types::{DbId, Day};
use async_trait::async_trait;

use crate::error::ClientError;

/// Backing store for allocation moves.
///
/// [`crate::api::ApiClient`] is the production implementation; tests use an
/// in-memory store.
#[async_trait]
pub trait AllocationStore: Send + Sync {
    /// Persist a new date for one allocation and return the stored row.
    async fn move_allocation(&self, id: DbId, date: Day) -> Result<Allocation, ClientError>;

    /// Re-read one allocation. `None` means it no longer exists.
    async fn fetch_allocation(&self, id: DbId) -> Result<Option<Allocation>, ClientError>;
}
