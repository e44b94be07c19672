//! SeaORM entities for tickets, status changes and users.

pub use ticket::Entity as TicketEntity;
pub use ticket_change::Entity as TicketChangeEntity;
pub use user::Entity as UserEntity;

/// Ticket entity for the `tickets` table.
pub mod ticket {
    use sea_orm::entity::prelude::*;
    use time::OffsetDateTime;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "tickets")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub title: String,
        pub ticket_description: String,
        pub ticket_type: String,
        pub severity: i32,
        pub ticket_priority: i32,
        pub ticket_status: String,
        pub creator_id: i64,
        pub owner_id: Option<i64>,
        pub created_at: OffsetDateTime,
        pub updated_at: OffsetDateTime,
        pub resolved_at: Option<OffsetDateTime>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::ticket_change::Entity")]
        Changes,
    }

    impl Related<super::ticket_change::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Changes.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Status change entity for the `tickets_changes` table.
pub mod ticket_change {
    use sea_orm::entity::prelude::*;
    use time::OffsetDateTime;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "tickets_changes")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub ticket_id: i64,
        pub creator_id: i64,
        pub to_status: String,
        pub changed_at: OffsetDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::ticket::Entity",
            from = "Column::TicketId",
            to = "super::ticket::Column::Id"
        )]
        Ticket,
    }

    impl Related<super::ticket::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Ticket.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// User entity for the `users` table.
pub mod user {
    use sea_orm::entity::prelude::*;
    use time::OffsetDateTime;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        #[sea_orm(unique)]
        pub email: String,
        pub password: String,
        pub user_type: String,
        pub created_at: OffsetDateTime,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
