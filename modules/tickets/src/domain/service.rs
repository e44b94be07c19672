use std::sync::Arc;

use ticketdesk_auth::Identity;
use time::OffsetDateTime;

use crate::contract::{
    CreateTicket, NewTicket, NewTicketChange, Ticket, TicketChange, TicketPage, TicketPatch,
    TicketStatus, TicketType,
};

use super::error::DomainError;
use super::repo::{StatusUpdate, StoreError, TicketUpdate, TicketsRepository};

const MIN_LEVEL: i32 = 1;
const MAX_LEVEL: i32 = 4;

pub struct ServiceConfig {
    pub page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { page_size: 1000 }
    }
}

/// Ticket lifecycle: creation, role-scoped reads, patching and the change log.
pub struct TicketsService {
    repo: Arc<dyn TicketsRepository>,
    config: ServiceConfig,
}

impl TicketsService {
    pub fn new(repo: Arc<dyn TicketsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// Validates `input` and stores it as a pending ticket owned by `caller`.
    pub async fn create_ticket(
        &self,
        caller: &Identity,
        input: CreateTicket,
    ) -> Result<Ticket, DomainError> {
        let new_ticket = validate_new_ticket(input, caller.user_id)?;
        let ticket = self.repo.save_ticket(new_ticket).await?;

        tracing::info!(ticket_id = ticket.id, creator_id = ticket.creator_id, "ticket created");
        Ok(ticket)
    }

    /// Returns the page of tickets after `after_id`. Admins see every ticket,
    /// other callers only the ones they created.
    pub async fn get_tickets(
        &self,
        caller: &Identity,
        after_id: i64,
    ) -> Result<TicketPage, DomainError> {
        let limit = self.config.page_size;
        let result = if caller.is_admin() {
            self.repo.list_tickets(after_id, limit).await
        } else {
            self.repo
                .list_tickets_by_creator(caller.user_id, after_id, limit)
                .await
        };

        match result {
            Ok(tickets) => {
                let page = TicketPage::from_tickets(tickets);
                tracing::debug!(after_id, last = page.last, total = page.total, "listed tickets");
                Ok(page)
            }
            Err(StoreError::NotFound) => Ok(TicketPage::empty()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_ticket(&self, caller: &Identity, id: i64) -> Result<Ticket, DomainError> {
        self.fetch_visible(caller, id).await
    }

    /// Applies `patches` in order and persists the result in one guarded
    /// update. A status change is then recorded in the change log; failing
    /// to record it does not fail the update.
    pub async fn update_ticket(
        &self,
        caller: &Identity,
        id: i64,
        patches: &[TicketPatch],
    ) -> Result<Ticket, DomainError> {
        if patches.is_empty() {
            return Err(DomainError::NothingToUpdate);
        }

        let ticket = self.fetch_visible(caller, id).await?;

        let now = OffsetDateTime::now_utc();
        let mut update = TicketUpdate::new(ticket.id, ticket.version, now);
        let mut change = None;

        for patch in patches {
            match *patch {
                TicketPatch::SetOwner(owner_id) => update.owner_id = Some(owner_id),
                TicketPatch::SetStatus(status) => {
                    update.status = Some(StatusUpdate {
                        status,
                        resolved_at: (status == TicketStatus::Resolved).then_some(now),
                    });
                    change = Some(NewTicketChange {
                        ticket_id: ticket.id,
                        creator_id: ticket.creator_id,
                        to_status: status,
                    });
                }
            }
        }

        let updated = self
            .repo
            .update_ticket(&update)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => DomainError::not_found("ticket"),
                StoreError::VersionConflict { id } => DomainError::VersionConflict { id },
                other => other.into(),
            })?;

        if let Some(change) = change {
            if let Err(e) = self.repo.save_ticket_change(change).await {
                tracing::warn!(
                    ticket_id = change.ticket_id,
                    to_status = %change.to_status,
                    error = %e,
                    "could not record ticket change"
                );
            }
        }

        tracing::info!(ticket_id = updated.id, version = updated.version, "ticket updated");
        Ok(updated)
    }

    /// Status changes on tickets created by `caller`.
    pub async fn get_ticket_changes(
        &self,
        caller: &Identity,
    ) -> Result<Vec<TicketChange>, DomainError> {
        Ok(self.repo.list_ticket_changes(caller.user_id).await?)
    }

    /// Loads a ticket the caller may see. Tickets of other users are
    /// reported as absent to non-admin callers.
    async fn fetch_visible(&self, caller: &Identity, id: i64) -> Result<Ticket, DomainError> {
        let ticket = self.repo.get_ticket(id).await.map_err(|e| match e {
            StoreError::NotFound => DomainError::not_found("ticket"),
            other => other.into(),
        })?;

        if !caller.is_admin() && ticket.creator_id != caller.user_id {
            tracing::debug!(
                ticket_id = id,
                user_id = caller.user_id,
                "ticket hidden from non-owner"
            );
            return Err(DomainError::not_found("ticket"));
        }

        Ok(ticket)
    }
}

/// Checks a creation request field by field, in a fixed order, and forces
/// the initial status to pending.
pub fn validate_new_ticket(input: CreateTicket, creator_id: i64) -> Result<NewTicket, DomainError> {
    let CreateTicket {
        title,
        description,
        ticket_type,
        severity,
        priority,
    } = input;

    if title.trim().is_empty() {
        return Err(DomainError::missing("title"));
    }
    if description.trim().is_empty() {
        return Err(DomainError::missing("description"));
    }
    if ticket_type.is_empty() {
        return Err(DomainError::missing("type"));
    }
    let ticket_type = ticket_type
        .parse::<TicketType>()
        .map_err(|e| DomainError::invalid("type", e.to_string()))?;
    validate_level("severity", severity)?;
    validate_level("priority", priority)?;
    if creator_id == 0 {
        return Err(DomainError::missing("creator id"));
    }

    Ok(NewTicket {
        title,
        description,
        ticket_type,
        severity,
        priority,
        status: TicketStatus::Pending,
        creator_id,
    })
}

fn validate_level(field: &'static str, value: i32) -> Result<(), DomainError> {
    if value == 0 {
        return Err(DomainError::missing(field));
    }
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&value) {
        return Err(DomainError::invalid(
            field,
            format!("must be between {MIN_LEVEL} and {MAX_LEVEL}"),
        ));
    }
    Ok(())
}
