use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use ticketdesk_auth::axum_ext::Authenticated;
use ticketdesk_errors::{ApiResult, Problem, bad_request};

use crate::domain::accounts::AccountsService;
use crate::domain::service::TicketsService;

use super::dto::{
    CreateTicketRequest, LoginRequest, LoginResponseDto, PatchOperationDto, SignupRequest,
    TicketChangeDto, TicketDto, TicketPageDto, TicketsQuery, UserDto, parse_patches,
};

fn parse_ticket_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| bad_request("invalid ticket id").with_current_trace_id())
}

/// Register a regular user account.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "accounts",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserDto),
        (status = 400, description = "Missing or malformed field", body = Problem),
        (status = 409, description = "Email already registered", body = Problem),
    )
)]
pub async fn signup(
    Extension(svc): Extension<Arc<AccountsService>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = body?;
    let user = svc.signup(req.into()).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponseDto),
        (status = 400, description = "Missing field or invalid credentials", body = Problem),
    )
)]
pub async fn login(
    Extension(svc): Extension<Arc<AccountsService>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponseDto>> {
    let Json(req) = body?;
    let result = svc.login(&req.email, &req.password).await?;
    Ok(Json(result.into()))
}

#[utoipa::path(
    post,
    path = "/tickets",
    tag = "tickets",
    request_body = CreateTicketRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Ticket created in pending state", body = TicketDto),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 401, description = "No bearer token", body = Problem),
        (status = 403, description = "Token rejected", body = Problem),
    )
)]
pub async fn create_ticket(
    Authenticated(caller): Authenticated,
    Extension(svc): Extension<Arc<TicketsService>>,
    body: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = body?;
    let ticket = svc.create_ticket(&caller, req.into()).await?;
    Ok((StatusCode::CREATED, Json(TicketDto::from(ticket))))
}

/// List tickets visible to the caller, oldest first, after a cursor.
#[utoipa::path(
    get,
    path = "/tickets",
    tag = "tickets",
    params(TicketsQuery),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "One page of tickets", body = TicketPageDto),
        (status = 400, description = "Invalid cursor", body = Problem),
        (status = 401, description = "No bearer token", body = Problem),
        (status = 403, description = "Token rejected", body = Problem),
    )
)]
pub async fn list_tickets(
    Authenticated(caller): Authenticated,
    Extension(svc): Extension<Arc<TicketsService>>,
    query: Result<Query<TicketsQuery>, QueryRejection>,
) -> ApiResult<Json<TicketPageDto>> {
    let Query(query) = query?;
    let after_id = query
        .after_id()
        .ok_or_else(|| bad_request("invalid pagination start id").with_current_trace_id())?;
    let page = svc.get_tickets(&caller, after_id).await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    get,
    path = "/tickets/{id}",
    tag = "tickets",
    params(("id" = i64, Path, description = "Ticket id")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "The ticket", body = TicketDto),
        (status = 400, description = "Invalid ticket id", body = Problem),
        (status = 404, description = "No such ticket visible to the caller", body = Problem),
    )
)]
pub async fn get_ticket(
    Authenticated(caller): Authenticated,
    Extension(svc): Extension<Arc<TicketsService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TicketDto>> {
    let id = parse_ticket_id(&id)?;
    let ticket = svc.get_ticket(&caller, id).await?;
    Ok(Json(ticket.into()))
}

/// Apply an ordered list of `update` operations on `ownerID` and `status`.
#[utoipa::path(
    patch,
    path = "/tickets/{id}",
    tag = "tickets",
    params(("id" = i64, Path, description = "Ticket id")),
    request_body = Vec<PatchOperationDto>,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "The updated ticket", body = TicketDto),
        (status = 400, description = "Malformed patch or nothing to update", body = Problem),
        (status = 404, description = "No such ticket visible to the caller", body = Problem),
        (status = 409, description = "Ticket modified concurrently", body = Problem),
    )
)]
pub async fn patch_ticket(
    Authenticated(caller): Authenticated,
    Extension(svc): Extension<Arc<TicketsService>>,
    Path(id): Path<String>,
    body: Result<Json<Vec<PatchOperationDto>>, JsonRejection>,
) -> ApiResult<Json<TicketDto>> {
    let id = parse_ticket_id(&id)?;
    let Json(ops) = body?;
    let patches = parse_patches(&ops)?;
    let ticket = svc.update_ticket(&caller, id, &patches).await?;
    Ok(Json(ticket.into()))
}

/// Status changes on tickets the caller created.
#[utoipa::path(
    get,
    path = "/changes",
    tag = "tickets",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Change log entries", body = Vec<TicketChangeDto>),
        (status = 401, description = "No bearer token", body = Problem),
        (status = 403, description = "Token rejected", body = Problem),
    )
)]
pub async fn list_changes(
    Authenticated(caller): Authenticated,
    Extension(svc): Extension<Arc<TicketsService>>,
) -> ApiResult<Json<Vec<TicketChangeDto>>> {
    let changes = svc.get_ticket_changes(&caller).await?;
    Ok(Json(changes.into_iter().map(Into::into).collect()))
}
