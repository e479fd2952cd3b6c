pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use models::{ContactMessage, Epaper, NewContactMessage, NewEpaper};

pub use memory::MemoryStore;
pub use postgres::{init_pool, DbConfig, PgStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("an e-paper for {0} already exists")]
    DuplicateDate(NaiveDate),

    #[error("store not available")]
    Unavailable,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence for e-papers and contact messages.
///
/// Lists come back newest first: e-papers by `date`, messages by `created_at`.
/// Mutations keyed by id report a missing row as `Ok(None)` / `Ok(false)`
/// so callers can turn it into a not-found answer.
#[async_trait]
pub trait NewsStore: Send + Sync {
    async fn ping(&self) -> Result<std::time::Duration, StoreError>;

    async fn list_epapers(&self) -> Result<Vec<Epaper>, StoreError>;

    async fn list_dates(&self) -> Result<Vec<NaiveDate>, StoreError>;

    async fn find_epaper_by_date(&self, date: NaiveDate) -> Result<Option<Epaper>, StoreError>;

    /// Fails with `DuplicateDate` when the date already has an edition.
    async fn create_epaper(&self, new: NewEpaper) -> Result<Epaper, StoreError>;

    async fn delete_epaper(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Atomically adds one view and returns the new count.
    async fn increment_views(&self, id: Uuid) -> Result<Option<i64>, StoreError>;

    async fn create_message(&self, new: NewContactMessage) -> Result<ContactMessage, StoreError>;

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, StoreError>;

    async fn set_message_read(
        &self,
        id: Uuid,
        is_read: bool,
    ) -> Result<Option<ContactMessage>, StoreError>;

    async fn delete_message(&self, id: Uuid) -> Result<bool, StoreError>;
}
