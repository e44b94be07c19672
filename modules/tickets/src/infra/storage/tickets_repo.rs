//! `SeaORM` repository implementation for tickets and their change log.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use time::OffsetDateTime;

use crate::contract::{NewTicket, NewTicketChange, Ticket, TicketChange};
use crate::domain::repo::{StoreError, TicketUpdate, TicketsRepository};

use super::entity::{TicketChangeEntity, TicketEntity, ticket, ticket_change};
use super::mapper::{new_change_to_active_model, new_ticket_to_active_model};

pub struct SeaOrmTicketsRepository {
    db: DatabaseConnection,
}

impl SeaOrmTicketsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_tickets(models: Vec<ticket::Model>) -> Result<Vec<Ticket>, StoreError> {
    models.into_iter().map(Ticket::try_from).collect()
}

#[async_trait]
impl TicketsRepository for SeaOrmTicketsRepository {
    async fn save_ticket(&self, ticket: NewTicket) -> Result<Ticket, StoreError> {
        let model = new_ticket_to_active_model(ticket, OffsetDateTime::now_utc())
            .insert(&self.db)
            .await?;
        model.try_into()
    }

    async fn get_ticket(&self, id: i64) -> Result<Ticket, StoreError> {
        TicketEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }

    async fn list_tickets(&self, after_id: i64, limit: u64) -> Result<Vec<Ticket>, StoreError> {
        let models = TicketEntity::find()
            .filter(ticket::Column::Id.gt(after_id))
            .order_by_asc(ticket::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        into_tickets(models)
    }

    async fn list_tickets_by_creator(
        &self,
        creator_id: i64,
        after_id: i64,
        limit: u64,
    ) -> Result<Vec<Ticket>, StoreError> {
        let models = TicketEntity::find()
            .filter(ticket::Column::CreatorId.eq(creator_id))
            .filter(ticket::Column::Id.gt(after_id))
            .order_by_asc(ticket::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        into_tickets(models)
    }

    async fn update_ticket(&self, update: &TicketUpdate) -> Result<Ticket, StoreError> {
        if update.is_empty() {
            return Err(StoreError::NothingToUpdate);
        }

        let mut stmt = TicketEntity::update_many()
            .col_expr(ticket::Column::UpdatedAt, Expr::value(update.updated_at))
            .col_expr(
                ticket::Column::Version,
                Expr::col(ticket::Column::Version).add(1),
            )
            .filter(ticket::Column::Id.eq(update.id))
            .filter(ticket::Column::Version.eq(update.expected_version));
        if let Some(owner_id) = update.owner_id {
            stmt = stmt.col_expr(ticket::Column::OwnerId, Expr::value(owner_id));
        }
        if let Some(status) = update.status {
            stmt = stmt
                .col_expr(
                    ticket::Column::TicketStatus,
                    Expr::value(status.status.as_str()),
                )
                .col_expr(ticket::Column::ResolvedAt, Expr::value(status.resolved_at));
        }

        let txn = self.db.begin().await?;
        let result = stmt.exec(&txn).await?;

        if result.rows_affected == 0 {
            let exists = TicketEntity::find_by_id(update.id).count(&txn).await? > 0;
            txn.rollback().await?;
            return Err(if exists {
                StoreError::VersionConflict { id: update.id }
            } else {
                StoreError::NotFound
            });
        }

        let model = TicketEntity::find_by_id(update.id)
            .one(&txn)
            .await?
            .ok_or(StoreError::NotFound)?;
        txn.commit().await?;

        model.try_into()
    }

    async fn save_ticket_change(&self, change: NewTicketChange) -> Result<(), StoreError> {
        TicketChangeEntity::insert(new_change_to_active_model(
            change,
            OffsetDateTime::now_utc(),
        ))
        .exec(&self.db)
        .await?;
        Ok(())
    }

    async fn list_ticket_changes(&self, creator_id: i64) -> Result<Vec<TicketChange>, StoreError> {
        TicketChangeEntity::find()
            .filter(ticket_change::Column::CreatorId.eq(creator_id))
            .order_by_asc(ticket_change::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(TicketChange::try_from)
            .collect()
    }
}
