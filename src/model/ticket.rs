//! Ticket: a request waiting for or receiving service.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{TerminalId, TicketId};

/// A request waiting for or receiving service at a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,

    /// Denormalized team name, shown on the board.
    pub team_name: String,

    pub status: TicketStatus,

    #[serde(default)]
    pub assigned_terminal_id: Option<TerminalId>,

    /// Denormalized terminal name, used by the marquee.
    #[serde(default)]
    pub assigned_terminal_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timestamp: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub called_timestamp: Option<Timestamp>,
}

/// Where a ticket stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Submitted, no terminal yet.
    WaitingAssignment,

    /// Assigned to a terminal and waiting in its queue.
    Queued,

    /// The terminal is calling this ticket up.
    Called,

    /// Being served.
    InProgress,

    Completed,
    Cancelled,
}

impl TicketStatus {
    /// Whether tickets in this status belong on the board.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Called | Self::InProgress)
    }
}

impl Ticket {
    /// Whether this ticket is active on the board.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
