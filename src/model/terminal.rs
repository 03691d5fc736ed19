//! Terminal: a service point with its own queue.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{TerminalId, TicketId};

/// A service point with its own queue of tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terminal {
    pub id: TerminalId,
    pub name: String,

    /// Closed terminals keep their queue but show none of it.
    #[serde(default)]
    pub is_open: bool,

    /// Staff member working this terminal. Carried through, never interpreted.
    #[serde(default)]
    pub assigned_staff_id: Option<String>,

    /// The ticket this terminal is calling or serving, if any.
    #[serde(default)]
    pub current_ticket_id: Option<TicketId>,

    /// Authoritative ordering of this terminal's tickets.
    ///
    /// Maintained by the store's owner. May briefly reference tickets that are
    /// no longer active, or miss tickets that were just assigned.
    #[serde(default)]
    pub queue_order: Vec<TicketId>,
}

impl Terminal {
    /// Index of every ticket id in `queue_order`. The first occurrence wins.
    pub fn queue_positions(&self) -> HashMap<&str, usize> {
        let mut positions = HashMap::with_capacity(self.queue_order.len());
        for (index, id) in self.queue_order.iter().enumerate() {
            positions.entry(id.as_str()).or_insert(index);
        }
        positions
    }
}
