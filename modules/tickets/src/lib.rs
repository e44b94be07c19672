//! Tickets module implementation
//!
//! Ticket lifecycle, signup/login and the change log, served over REST and
//! persisted with SeaORM.

pub use contract::{
    Ticket, TicketChange, TicketPage, TicketPatch, TicketStatus, TicketType, User,
};

pub mod contract;
pub mod module;
pub use config::TicketsConfig;
pub use module::TicketsModule;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
