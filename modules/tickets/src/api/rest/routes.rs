use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use ticketdesk_auth::{TokenVerifier, axum_ext::require_identity};

use crate::domain::accounts::AccountsService;
use crate::domain::service::TicketsService;

use super::handlers;

/// Public account routes plus the ticket routes behind the access gate.
///
/// The gate is a route layer, so unknown paths still answer 404 rather than 401.
pub fn register_routes(
    router: Router,
    tickets: Arc<TicketsService>,
    accounts: Arc<AccountsService>,
    verifier: Arc<TokenVerifier>,
) -> Router {
    let protected = Router::new()
        .route(
            "/tickets",
            post(handlers::create_ticket).get(handlers::list_tickets),
        )
        .route(
            "/tickets/{id}",
            get(handlers::get_ticket).patch(handlers::patch_ticket),
        )
        .route("/changes", get(handlers::list_changes))
        .route_layer(from_fn_with_state(verifier, require_identity));

    let public = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login));

    router
        .merge(public)
        .merge(protected)
        .layer(Extension(tickets))
        .layer(Extension(accounts))
}
