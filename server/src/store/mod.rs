//! Persistence gateway for events and the user accounts they reference.
//!
//! Handlers and services only see the [`EventStore`] and [`UserStore`]
//! traits. [`PgStore`] backs them with PostgreSQL; [`MemoryStore`] keeps
//! everything in process and is used when no database is configured.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Event, EventWithCreator, NewEvent, NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A record with the same unique key already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert(&self, new: NewEvent) -> Result<Event, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn find_with_creator(&self, id: Uuid)
        -> Result<Option<EventWithCreator>, StoreError>;

    async fn list(&self) -> Result<Vec<EventWithCreator>, StoreError>;

    /// Writes every mutable field of `event` and returns the stored record,
    /// or `None` if the id no longer exists.
    async fn update(&self, event: &Event) -> Result<Option<Event>, StoreError>;

    /// Returns `true` when a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Case-insensitive substring match on title, description or event type.
    async fn search(&self, query: &str) -> Result<Vec<EventWithCreator>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;

    async fn find(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
