//! Core data model for the board.
//!
//! These types mirror the records delivered by the store:
//! terminals (service points) and tickets (requests waiting for or receiving service).
//! The board never mutates a record; every snapshot replaces the previous one.

mod terminal;
mod ticket;

pub use terminal::Terminal;
pub use ticket::{Ticket, TicketStatus};

/// Identifier of a terminal document.
pub type TerminalId = String;

/// Identifier of a ticket document.
pub type TicketId = String;
