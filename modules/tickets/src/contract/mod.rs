//! Public types of the tickets module.

pub mod model;

pub use model::{
    CreateTicket, LoginResult, NewTicket, NewTicketChange, NewUser, Signup, Ticket, TicketChange,
    TicketPage, TicketPatch, TicketStatus, TicketType, UnknownVariant, User,
};
