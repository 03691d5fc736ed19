//! Notification engine: one audio cue per update in which a ticket became `called`.
//!
//! The engine compares each ticket snapshot with the one before it. Detection only
//! depends on the order snapshots are fed in, so any host (the watch loop, a test,
//! a replay) can drive it. Audio consent is a plain gate in front of playback.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::audio::AudioOutput;
use crate::model::{Ticket, TicketId, TicketStatus};

/// What happened to the audio output during one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// Nothing to announce, or no consent to announce it.
    Quiet,

    /// One playback was started for these newly called tickets.
    Played { newly_called: Vec<TicketId> },

    /// A playback was due but the output refused it.
    Failed { newly_called: Vec<TicketId> },
}

/// Edge-triggered notifier for tickets entering `called`.
pub struct Notifier<A> {
    audio: A,
    /// Statuses from the last snapshot. `None` until the first snapshot arrives.
    previous: Option<HashMap<TicketId, TicketStatus>>,
    consent_granted: bool,
}

impl<A: AudioOutput> Notifier<A> {
    pub fn new(audio: A) -> Self {
        Self {
            audio,
            previous: None,
            consent_granted: false,
        }
    }

    pub fn consent_granted(&self) -> bool {
        self.consent_granted
    }

    /// Record the user's opt-in to sound.
    ///
    /// Call this only from a user action. The output is unlocked silently; if that
    /// fails the consent still stands and the failure is logged.
    pub fn grant_consent(&mut self) {
        if self.consent_granted {
            return;
        }
        self.consent_granted = true;
        match self.audio.unlock() {
            Ok(()) => debug!("audio unlocked"),
            Err(e) => warn!(error = %e, "audio unlock failed"),
        }
    }

    /// Feed the next ticket snapshot, in arrival order.
    ///
    /// Starts at most one playback no matter how many tickets were called at once.
    /// The very first snapshot never plays: there is nothing to compare it with.
    pub fn on_snapshot(&mut self, tickets: &[Ticket]) -> Cue {
        let previous = self.previous.replace(statuses(tickets));

        if !self.consent_granted {
            return Cue::Quiet;
        }
        let Some(previous) = previous else {
            return Cue::Quiet;
        };

        let newly_called = newly_called(&previous, tickets);
        if newly_called.is_empty() {
            return Cue::Quiet;
        }

        match self.audio.play() {
            Ok(()) => {
                info!(tickets = ?newly_called, "ticket called, notification played");
                Cue::Played { newly_called }
            }
            Err(e) => {
                warn!(error = %e, tickets = ?newly_called, "notification sound failed to play");
                Cue::Failed { newly_called }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn audio(&self) -> &A {
        &self.audio
    }
}

fn statuses(tickets: &[Ticket]) -> HashMap<TicketId, TicketStatus> {
    tickets.iter().map(|t| (t.id.clone(), t.status)).collect()
}

/// Tickets that are `called` now but were absent or not `called` before.
fn newly_called(previous: &HashMap<TicketId, TicketStatus>, current: &[Ticket]) -> Vec<TicketId> {
    current
        .iter()
        .filter(|t| t.status == TicketStatus::Called)
        .filter(|t| previous.get(&t.id) != Some(&TicketStatus::Called))
        .map(|t| t.id.clone())
        .collect()
}
