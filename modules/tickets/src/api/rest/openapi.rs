use ticketdesk_errors::Problem;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::contract::{TicketStatus, TicketType};

use super::dto::{
    CreateTicketRequest, LoginRequest, LoginResponseDto, PatchOperationDto, SignupRequest,
    TicketChangeDto, TicketDto, TicketPageDto, UserDto,
};
use super::handlers;

/// OpenAPI document for every route the tickets module serves.
#[derive(OpenApi)]
#[openapi(
    info(title = "ticketdesk", description = "Multi-tenant ticket backend"),
    paths(
        handlers::signup,
        handlers::login,
        handlers::create_ticket,
        handlers::list_tickets,
        handlers::get_ticket,
        handlers::patch_ticket,
        handlers::list_changes,
    ),
    components(schemas(
        TicketDto,
        TicketPageDto,
        TicketChangeDto,
        CreateTicketRequest,
        PatchOperationDto,
        UserDto,
        SignupRequest,
        LoginRequest,
        LoginResponseDto,
        TicketType,
        TicketStatus,
        Problem,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "accounts", description = "Signup and login"),
        (name = "tickets", description = "Ticket lifecycle and change log"),
    )
)]
pub struct TicketsApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
