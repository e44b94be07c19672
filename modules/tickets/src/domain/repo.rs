use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::contract::{
    NewTicket, NewTicketChange, NewUser, Ticket, TicketChange, TicketStatus, User,
};

/// Failures a store implementation may report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("nothing to update")]
    NothingToUpdate,

    #[error("version conflict on {id}")]
    VersionConflict { id: i64 },

    #[error("duplicate value for {field}")]
    Duplicate { field: &'static str },

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

/// New status together with the resolution timestamp it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: TicketStatus,
    pub resolved_at: Option<OffsetDateTime>,
}

/// Field changes for one ticket, applied only if the stored version still
/// equals `expected_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUpdate {
    pub id: i64,
    pub expected_version: i32,
    pub owner_id: Option<i64>,
    pub status: Option<StatusUpdate>,
    pub updated_at: OffsetDateTime,
}

impl TicketUpdate {
    pub fn new(id: i64, expected_version: i32, updated_at: OffsetDateTime) -> Self {
        Self {
            id,
            expected_version,
            owner_id: None,
            status: None,
            updated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owner_id.is_none() && self.status.is_none()
    }
}

/// Durable ticket state. List operations return tickets with `id > after_id`
/// in ascending id order, at most `limit` of them.
#[async_trait]
pub trait TicketsRepository: Send + Sync {
    async fn save_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError>;

    async fn get_ticket(&self, id: i64) -> Result<Ticket, StoreError>;

    async fn list_tickets(&self, after_id: i64, limit: u64) -> Result<Vec<Ticket>, StoreError>;

    async fn list_tickets_by_creator(
        &self,
        creator_id: i64,
        after_id: i64,
        limit: u64,
    ) -> Result<Vec<Ticket>, StoreError>;

    /// Applies `update` and returns the stored ticket.
    ///
    /// Fails with `NothingToUpdate` for an empty update, `NotFound` for an
    /// unknown id and `VersionConflict` when the version has moved on.
    async fn update_ticket(&self, update: &TicketUpdate) -> Result<Ticket, StoreError>;

    async fn save_ticket_change(&self, change: NewTicketChange) -> Result<(), StoreError>;

    async fn list_ticket_changes(&self, creator_id: i64) -> Result<Vec<TicketChange>, StoreError>;
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Fails with `Duplicate { field: "email" }` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;
}
