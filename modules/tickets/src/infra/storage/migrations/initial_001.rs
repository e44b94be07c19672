use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::UserType).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::Title).string().not_null())
                    .col(ColumnDef::new(Tickets::TicketDescription).text().not_null())
                    .col(ColumnDef::new(Tickets::TicketType).string().not_null())
                    .col(ColumnDef::new(Tickets::Severity).integer().not_null())
                    .col(ColumnDef::new(Tickets::TicketPriority).integer().not_null())
                    .col(ColumnDef::new(Tickets::TicketStatus).string().not_null())
                    .col(ColumnDef::new(Tickets::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::OwnerId).big_integer())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Tickets::ResolvedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Cursor listing for non-admin callers filters on creator then id
        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_creator_id")
                    .table(Tickets::Table)
                    .col(Tickets::CreatorId)
                    .col(Tickets::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketsChanges::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TicketsChanges::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TicketsChanges::TicketId).big_integer().not_null())
                    .col(ColumnDef::new(TicketsChanges::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(TicketsChanges::ToStatus).string().not_null())
                    .col(
                        ColumnDef::new(TicketsChanges::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tickets_changes_creator_id")
                    .table(TicketsChanges::Table)
                    .col(TicketsChanges::CreatorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TicketsChanges::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    UserType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    Title,
    TicketDescription,
    TicketType,
    Severity,
    TicketPriority,
    TicketStatus,
    CreatorId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

#[derive(DeriveIden)]
enum TicketsChanges {
    Table,
    Id,
    TicketId,
    CreatorId,
    ToStatus,
    ChangedAt,
}
