//! Entity to domain model mappers.
//!
//! Enum-valued columns are stored as text, so loading a row can fail when the
//! column holds a value this build does not know.

use sea_orm::ActiveValue::{NotSet, Set};
use time::OffsetDateTime;

use crate::contract::{
    NewTicket, NewTicketChange, NewUser, Ticket, TicketChange, TicketStatus, TicketType, User,
};
use crate::domain::repo::StoreError;

use super::entity::{ticket, ticket_change, user};

fn corrupt_column(column: &str, value: &str) -> StoreError {
    StoreError::database(format!("unexpected {column} value '{value}' in storage"))
}

impl TryFrom<ticket::Model> for Ticket {
    type Error = StoreError;

    fn try_from(model: ticket::Model) -> Result<Self, Self::Error> {
        let ticket_type = model
            .ticket_type
            .parse::<TicketType>()
            .map_err(|_| corrupt_column("ticket_type", &model.ticket_type))?;
        let status = model
            .ticket_status
            .parse::<TicketStatus>()
            .map_err(|_| corrupt_column("ticket_status", &model.ticket_status))?;

        Ok(Self {
            id: model.id,
            title: model.title,
            description: model.ticket_description,
            ticket_type,
            severity: model.severity,
            priority: model.ticket_priority,
            status,
            creator_id: model.creator_id,
            owner_id: model.owner_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            resolved_at: model.resolved_at,
            version: model.version,
        })
    }
}

impl TryFrom<ticket_change::Model> for TicketChange {
    type Error = StoreError;

    fn try_from(model: ticket_change::Model) -> Result<Self, Self::Error> {
        let to_status = model
            .to_status
            .parse::<TicketStatus>()
            .map_err(|_| corrupt_column("to_status", &model.to_status))?;

        Ok(Self {
            id: model.id,
            ticket_id: model.ticket_id,
            creator_id: model.creator_id,
            to_status,
            changed_at: model.changed_at,
        })
    }
}

impl TryFrom<user::Model> for User {
    type Error = StoreError;

    fn try_from(model: user::Model) -> Result<Self, Self::Error> {
        let role = model
            .user_type
            .parse()
            .map_err(|_| corrupt_column("user_type", &model.user_type))?;

        Ok(Self {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password,
            role,
            created_at: model.created_at,
        })
    }
}

/// Active model for a fresh ticket at version 1.
pub fn new_ticket_to_active_model(ticket: NewTicket, now: OffsetDateTime) -> ticket::ActiveModel {
    ticket::ActiveModel {
        id: NotSet,
        title: Set(ticket.title),
        ticket_description: Set(ticket.description),
        ticket_type: Set(ticket.ticket_type.as_str().to_owned()),
        severity: Set(ticket.severity),
        ticket_priority: Set(ticket.priority),
        ticket_status: Set(ticket.status.as_str().to_owned()),
        creator_id: Set(ticket.creator_id),
        owner_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        resolved_at: Set(None),
        version: Set(1),
    }
}

pub fn new_change_to_active_model(
    change: NewTicketChange,
    now: OffsetDateTime,
) -> ticket_change::ActiveModel {
    ticket_change::ActiveModel {
        id: NotSet,
        ticket_id: Set(change.ticket_id),
        creator_id: Set(change.creator_id),
        to_status: Set(change.to_status.as_str().to_owned()),
        changed_at: Set(now),
    }
}

pub fn new_user_to_active_model(user: NewUser, now: OffsetDateTime) -> user::ActiveModel {
    user::ActiveModel {
        id: NotSet,
        name: Set(user.name),
        email: Set(user.email),
        password: Set(user.password_hash),
        user_type: Set(user.role.as_str().to_owned()),
        created_at: Set(now),
    }
}
