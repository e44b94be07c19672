//! Wiring for the tickets module: services, repositories and REST routes.

use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use ticketdesk_auth::{AuthConfig, TokenIssuer, TokenVerifier};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::{openapi::TicketsApiDoc, routes};
use crate::config::TicketsConfig;
use crate::domain::accounts::AccountsService;
use crate::domain::password::BcryptHasher;
use crate::domain::service::{ServiceConfig, TicketsService};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::tickets_repo::SeaOrmTicketsRepository;
use crate::infra::storage::users_repo::SeaOrmUsersRepository;

/// Tickets module.
///
/// Owns the ticket lifecycle and account services and exposes them over REST.
pub struct TicketsModule {
    tickets: Arc<TicketsService>,
    accounts: Arc<AccountsService>,
    verifier: Arc<TokenVerifier>,
}

impl TicketsModule {
    pub fn init(
        db: DatabaseConnection,
        auth: &AuthConfig,
        cfg: &TicketsConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing tickets module");

        if !auth.has_secret() {
            anyhow::bail!("auth.secret must not be empty");
        }
        cfg.validate()?;
        debug!(
            page_size = cfg.page_size,
            bcrypt_cost = cfg.bcrypt_cost,
            issuer = %auth.issuer,
            "Loaded tickets config"
        );

        let tickets = Arc::new(TicketsService::new(
            Arc::new(SeaOrmTicketsRepository::new(db.clone())),
            ServiceConfig {
                page_size: cfg.page_size,
            },
        ));
        let accounts = Arc::new(AccountsService::new(
            Arc::new(SeaOrmUsersRepository::new(db)),
            Arc::new(BcryptHasher::new(cfg.bcrypt_cost)),
            Arc::new(TokenIssuer::new(auth)),
        ));

        info!("Tickets module initialized");
        Ok(Self {
            tickets,
            accounts,
            verifier: Arc::new(TokenVerifier::new(auth)),
        })
    }

    /// Applies pending schema migrations.
    pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
        info!("Running tickets migrations");
        Migrator::up(db, None).await
    }

    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering tickets REST routes");
        routes::register_routes(
            router,
            Arc::clone(&self.tickets),
            Arc::clone(&self.accounts),
            Arc::clone(&self.verifier),
        )
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        TicketsApiDoc::openapi()
    }
}
