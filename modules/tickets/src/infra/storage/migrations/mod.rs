//! Schema migrations for the tickets module.

use sea_orm_migration::prelude::*;

mod initial_001;
mod ticket_version_002;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(initial_001::Migration),
            Box::new(ticket_version_002::Migration),
        ]
    }
}
