//! Board state: the latest snapshot of each collection and everything derived from it.
//!
//! Terminal and ticket snapshots are applied independently as they arrive. Each one
//! replaces the previous snapshot of its collection wholesale; derived views are
//! recomputed from whatever the latest pair is, so no interleaving of the two
//! streams needs special handling.

use jiff::Timestamp;
use serde::Serialize;
use tracing::{debug, warn};

use crate::audio::AudioOutput;
use crate::feed::{Collection, Delivery};
use crate::marquee;
use crate::model::{Terminal, Ticket};
use crate::notify::{Cue, Notifier};
use crate::queue::{self, TerminalView};

/// What applying a delivery did to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// A snapshot replaced the board's copy of its collection.
    Updated(Cue),

    /// Nothing changed: the delivery failed and the last good state stands.
    Kept,

    /// A subscription ended.
    Closed(Collection),
}

/// Live board state.
pub struct Board<A> {
    terminals: Vec<Terminal>,
    tickets: Vec<Ticket>,
    notifier: Notifier<A>,
    updated_at: Option<Timestamp>,
}

impl<A: AudioOutput> Board<A> {
    pub fn new(audio: A) -> Self {
        Self {
            terminals: Vec::new(),
            tickets: Vec::new(),
            notifier: Notifier::new(audio),
            updated_at: None,
        }
    }

    /// Replace the terminal snapshot.
    pub fn apply_terminals(&mut self, terminals: Vec<Terminal>) {
        debug!(count = terminals.len(), "terminals updated");
        self.terminals = terminals;
        self.updated_at = Some(Timestamp::now());
    }

    /// Replace the active-ticket snapshot and run call detection on it.
    pub fn apply_tickets(&mut self, tickets: Vec<Ticket>) -> Cue {
        debug!(count = tickets.len(), "tickets updated");
        let cue = self.notifier.on_snapshot(&tickets);
        self.tickets = tickets;
        self.updated_at = Some(Timestamp::now());
        cue
    }

    /// Apply one delivery from a subscription.
    pub fn apply(&mut self, delivery: Delivery) -> Applied {
        match delivery {
            Delivery::Terminals(terminals) => {
                self.apply_terminals(terminals);
                Applied::Updated(Cue::Quiet)
            }
            Delivery::Tickets(tickets) => Applied::Updated(self.apply_tickets(tickets)),
            Delivery::Failed { collection, error } => {
                warn!(%collection, error = %error, "snapshot not delivered, keeping last good state");
                Applied::Kept
            }
            Delivery::Closed(collection) => Applied::Closed(collection),
        }
    }

    /// The user opted in to sound.
    pub fn grant_consent(&mut self) {
        self.notifier.grant_consent();
    }

    /// Everything the presentation layer may read.
    pub fn view(&self) -> BoardView<'_> {
        BoardView {
            terminals: queue::terminal_views(&self.terminals, &self.tickets),
            marquee: marquee::compose(&self.tickets),
            consent_required: !self.notifier.consent_granted(),
            updated_at: self.updated_at,
        }
    }

    #[cfg(test)]
    pub(crate) fn notifier(&self) -> &Notifier<A> {
        &self.notifier
    }
}

/// The rendering boundary: derived state for one update cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView<'a> {
    /// One card per terminal, in terminal snapshot order.
    pub terminals: Vec<TerminalView<'a>>,

    /// Announcement band. `None` means no band at all.
    pub marquee: Option<String>,

    /// Sound is off until the user opts in.
    pub consent_required: bool,

    /// When the last snapshot was applied.
    pub updated_at: Option<Timestamp>,
}
