//! Service tickets: CRUD plus the assignment engine for mechanics and parts.

pub mod assignment;
pub mod ticket_service;

pub use assignment::EditMechanics;
pub use ticket_service::{CreateTicket, TicketView, UpdateTicket};
