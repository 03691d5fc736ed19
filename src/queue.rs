//! Queue materialization: per-terminal ordered queues derived from the latest snapshots.
//!
//! Everything here is a pure function of the current terminals and tickets.
//! Nothing is remembered between calls, so the two record streams can update
//! in any interleaving and the result only depends on the latest value of each.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{Terminal, Ticket, TicketStatus};

/// Ordered tickets per terminal id.
pub type TerminalQueues<'a> = BTreeMap<&'a str, Vec<&'a Ticket>>;

/// Group active tickets by terminal and order each group by the terminal's `queue_order`.
///
/// Every terminal gets an entry, possibly empty. A ticket assigned to a terminal that
/// isn't in `terminals` appears nowhere. Tickets missing from `queue_order` sort after
/// every listed ticket and keep their snapshot order among themselves.
pub fn materialize<'a>(terminals: &'a [Terminal], tickets: &'a [Ticket]) -> TerminalQueues<'a> {
    terminals
        .iter()
        .map(|terminal| (terminal.id.as_str(), terminal_queue(terminal, tickets)))
        .collect()
}

fn terminal_queue<'a>(terminal: &Terminal, tickets: &'a [Ticket]) -> Vec<&'a Ticket> {
    let positions = terminal.queue_positions();
    let mut queue: Vec<&Ticket> = tickets
        .iter()
        .filter(|t| t.assigned_terminal_id.as_deref() == Some(terminal.id.as_str()))
        .collect();
    // Stable: unlisted tickets share `usize::MAX` and keep their relative order.
    queue.sort_by_key(|t| positions.get(t.id.as_str()).copied().unwrap_or(usize::MAX));
    queue
}

/// The member of `queue` the terminal points at with `current_ticket_id`.
///
/// `None` when the terminal points at nothing, or at a ticket that is no longer active.
pub fn current_ticket<'a>(terminal: &Terminal, queue: &[&'a Ticket]) -> Option<&'a Ticket> {
    let current_id = terminal.current_ticket_id.as_deref()?;
    queue.iter().copied().find(|t| t.id == current_id)
}

/// What the current slot of a terminal card announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CallState {
    /// The ticket is being called up.
    Calling,
    /// The ticket is being served.
    Serving,
}

impl CallState {
    fn of(status: TicketStatus) -> Option<Self> {
        match status {
            TicketStatus::Called => Some(Self::Calling),
            TicketStatus::InProgress => Some(Self::Serving),
            _ => None,
        }
    }

    /// Card heading for the current slot.
    pub fn label(self) -> &'static str {
        match self {
            Self::Calling => "Now Calling",
            Self::Serving => "Now Serving",
        }
    }
}

/// The ticket shown in a terminal's current slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTicket<'a> {
    pub ticket: &'a Ticket,
    pub state: CallState,
}

/// A numbered entry of a terminal's waiting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingTicket<'a> {
    /// 1-based place in line.
    pub position: usize,
    pub ticket: &'a Ticket,
}

/// Display subdivision of one terminal's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub is_open: bool,

    /// The full ordered queue.
    pub queue: Vec<&'a Ticket>,

    /// The current ticket, when it is being called or served.
    pub current: Option<CurrentTicket<'a>>,

    /// Queued tickets, numbered from 1 in queue order.
    pub waiting: Vec<WaitingTicket<'a>>,
}

impl<'a> TerminalView<'a> {
    /// Split a materialized queue into the current slot and the waiting list.
    pub fn new(terminal: &'a Terminal, queue: Vec<&'a Ticket>) -> Self {
        let current = current_ticket(terminal, &queue).and_then(|ticket| {
            CallState::of(ticket.status).map(|state| CurrentTicket { ticket, state })
        });
        let waiting = queue
            .iter()
            .copied()
            .filter(|t| t.status == TicketStatus::Queued)
            .enumerate()
            .map(|(index, ticket)| WaitingTicket {
                position: index + 1,
                ticket,
            })
            .collect();

        Self {
            id: &terminal.id,
            name: &terminal.name,
            is_open: terminal.is_open,
            queue,
            current,
            waiting,
        }
    }

    /// Open, with nobody called, served, or waiting.
    pub fn is_idle(&self) -> bool {
        self.is_open && self.current.is_none() && self.waiting.is_empty()
    }
}

/// Materialize and subdivide every terminal, in the order `terminals` is given.
pub fn terminal_views<'a>(terminals: &'a [Terminal], tickets: &'a [Ticket]) -> Vec<TerminalView<'a>> {
    let mut queues = materialize(terminals, tickets);
    terminals
        .iter()
        .map(|terminal| {
            let queue = queues.remove(terminal.id.as_str()).unwrap_or_default();
            TerminalView::new(terminal, queue)
        })
        .collect()
}
