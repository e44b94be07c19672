//! REST DTOs for tickets and accounts.
//!
//! Field names follow the wire format existing clients use (`ticketID`,
//! `creatorID`, `userType`, ...), hence the explicit renames.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use ticketdesk_auth::Role;
use utoipa::{IntoParams, ToSchema};

use crate::contract::{
    CreateTicket, LoginResult, Signup, Ticket, TicketChange, TicketPage, TicketPatch,
    TicketStatus, TicketType, User,
};
use crate::domain::error::DomainError;

const UPDATE_OP: &str = "update";
const OWNER_PATH: &str = "ownerID";
const STATUS_PATH: &str = "status";

/// REST DTO for a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketDto {
    #[serde(rename = "ticketID")]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub ticket_type: TicketType,
    pub severity: i32,
    pub priority: i32,
    pub status: TicketStatus,
    #[serde(rename = "creatorID")]
    pub creator_id: i64,
    #[serde(rename = "ownerID")]
    pub owner_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    /// Incremented on every successful update.
    pub version: i32,
}

impl From<Ticket> for TicketDto {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            ticket_type: t.ticket_type,
            severity: t.severity,
            priority: t.priority,
            status: t.status,
            creator_id: t.creator_id,
            owner_id: t.owner_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
            resolved_at: t.resolved_at,
            version: t.version,
        }
    }
}

/// Ticket creation body. Missing fields default to empty or zero so that the
/// service reports them as missing.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    /// One of `support`, `suggestion`, `assistance`.
    pub ticket_type: String,
    /// 1 (lowest) to 4 (highest).
    pub severity: i32,
    /// 1 (lowest) to 4 (highest).
    pub priority: i32,
}

impl From<CreateTicketRequest> for CreateTicket {
    fn from(req: CreateTicketRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            ticket_type: req.ticket_type,
            severity: req.severity,
            priority: req.priority,
        }
    }
}

/// One page of tickets; pass `last` as `after_id` to fetch the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TicketPageDto {
    pub tickets: Vec<TicketDto>,
    pub last: i64,
    pub total: usize,
}

impl From<TicketPage> for TicketPageDto {
    fn from(page: TicketPage) -> Self {
        Self {
            tickets: page.tickets.into_iter().map(Into::into).collect(),
            last: page.last,
            total: page.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketChangeDto {
    #[serde(rename = "changeID")]
    pub id: i64,
    #[serde(rename = "ticketID")]
    pub ticket_id: i64,
    #[serde(rename = "creatorID")]
    pub creator_id: i64,
    /// Status the ticket moved to.
    pub to: TicketStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub changed_at: OffsetDateTime,
}

impl From<TicketChange> for TicketChangeDto {
    fn from(c: TicketChange) -> Self {
        Self {
            id: c.id,
            ticket_id: c.ticket_id,
            creator_id: c.creator_id,
            to: c.to_status,
            changed_at: c.changed_at,
        }
    }
}

/// A single JSON-Patch-like operation. The request body is an array of these,
/// applied in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PatchOperationDto {
    /// Only `update` is supported.
    pub op: String,
    /// `ownerID` or `status`; other paths are ignored.
    pub path: String,
    #[schema(value_type = Object)]
    pub value: Value,
}

impl PatchOperationDto {
    /// Turns the raw operation into a typed patch. Returns `Ok(None)` for a
    /// well-formed operation on a path that cannot be patched.
    pub fn parse(&self) -> Result<Option<TicketPatch>, DomainError> {
        if self.op.is_empty() {
            return Err(DomainError::MissingPatchOperation);
        }
        if self.path.is_empty() {
            return Err(DomainError::MissingPatchPath);
        }
        if is_blank(&self.value) {
            return Err(DomainError::MissingPatchValue);
        }
        if self.op != UPDATE_OP {
            return Err(DomainError::invalid_patch_operation(self.op.as_str()));
        }

        match self.path.as_str() {
            OWNER_PATH => match self.value.as_i64() {
                Some(owner_id) if owner_id > 0 => Ok(Some(TicketPatch::SetOwner(owner_id))),
                _ => Err(DomainError::InvalidOwnerId),
            },
            STATUS_PATH => self
                .value
                .as_str()
                .and_then(|s| s.parse::<TicketStatus>().ok())
                .map(|status| Some(TicketPatch::SetStatus(status)))
                .ok_or(DomainError::InvalidStatus),
            other => {
                tracing::debug!(path = other, "ignoring patch on unsupported path");
                Ok(None)
            }
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Parses every operation, failing on the first malformed one.
pub fn parse_patches(ops: &[PatchOperationDto]) -> Result<Vec<TicketPatch>, DomainError> {
    let mut patches = Vec::with_capacity(ops.len());
    for op in ops {
        if let Some(patch) = op.parse()? {
            patches.push(patch);
        }
    }
    Ok(patches)
}

/// Query parameters of `GET /tickets`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketsQuery {
    /// Return tickets with an id greater than this one. Defaults to 0, must not be negative.
    pub after_id: Option<String>,
}

impl TicketsQuery {
    /// A missing or empty `after_id` starts from the beginning.
    /// Non-integers and negative values are rejected.
    pub fn after_id(&self) -> Option<i64> {
        match self.after_id.as_deref() {
            None | Some("") => Some(0),
            Some(raw) => raw.parse().ok().filter(|id: &i64| *id >= 0),
        }
    }
}

/// REST DTO for a user. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(rename = "userID")]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[schema(value_type = String)]
    pub user_type: Role,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            user_type: u.role,
        }
    }
}

/// Signup body. A `userType` sent by the client is accepted and ignored.
#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[schema(value_type = Option<String>)]
    pub user_type: Option<String>,
}

impl From<SignupRequest> for Signup {
    fn from(req: SignupRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub user: UserDto,
    /// HS256 bearer token for the `Authorization` header.
    pub token: String,
}

impl From<LoginResult> for LoginResponseDto {
    fn from(r: LoginResult) -> Self {
        Self {
            user: r.user.into(),
            token: r.token,
        }
    }
}
