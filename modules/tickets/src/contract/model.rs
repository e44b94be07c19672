use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ticketdesk_auth::Role;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Kind of request a ticket represents.
///
/// Older clients send the misspelled `sugestion` and `asistance`; both are
/// accepted on input and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Support,
    #[serde(alias = "sugestion")]
    Suggestion,
    #[serde(alias = "asistance")]
    Assistance,
}

impl TicketType {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketType::Support => "support",
            TicketType::Suggestion => "suggestion",
            TicketType::Assistance => "assistance",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "support" => Ok(TicketType::Support),
            "suggestion" | "sugestion" => Ok(TicketType::Suggestion),
            "assistance" | "asistance" => Ok(TicketType::Assistance),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

/// Ticket lifecycle state. Transitions between states are not restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TicketStatus::Pending),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ticket_type: TicketType,
    pub severity: i32,
    pub priority: i32,
    pub status: TicketStatus,
    pub creator_id: i64,
    pub owner_id: Option<i64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub resolved_at: Option<OffsetDateTime>,
    /// Incremented on every successful update; guards concurrent patches.
    pub version: i32,
}

/// Unvalidated ticket creation request.
#[derive(Debug, Clone, Default)]
pub struct CreateTicket {
    pub title: String,
    pub description: String,
    pub ticket_type: String,
    pub severity: i32,
    pub priority: i32,
}

/// Validated ticket ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub ticket_type: TicketType,
    pub severity: i32,
    pub priority: i32,
    pub status: TicketStatus,
    pub creator_id: i64,
}

/// One page of tickets. `last` is the cursor for the next request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketPage {
    pub tickets: Vec<Ticket>,
    pub last: i64,
    pub total: usize,
}

impl TicketPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_tickets(tickets: Vec<Ticket>) -> Self {
        let last = tickets.last().map_or(0, |t| t.id);
        let total = tickets.len();
        Self {
            tickets,
            last,
            total,
        }
    }
}

/// A single parsed patch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketPatch {
    SetOwner(i64),
    SetStatus(TicketStatus),
}

/// Audit entry recorded when a patch changes a ticket's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketChange {
    pub id: i64,
    pub ticket_id: i64,
    pub creator_id: i64,
    pub to_status: TicketStatus,
    pub changed_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTicketChange {
    pub ticket_id: i64,
    pub creator_id: i64,
    pub to_status: TicketStatus,
}

/// Account record. The password hash never leaves the service layer.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Unvalidated signup request carrying the plain-text password.
#[derive(Clone, Default)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Signup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signup")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Account ready to be stored, with the password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub token: String,
}
