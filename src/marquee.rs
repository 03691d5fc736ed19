//! Marquee: the rotating announcement of tickets being called.

use crate::model::{Ticket, TicketStatus};

/// Separator between marquee announcements.
pub const SEPARATOR: &str = " ••• ";

/// Compose the marquee from an active-ticket snapshot.
///
/// One announcement per called ticket that knows its terminal name, in snapshot order.
/// Returns `None` when nothing is being called, so callers can drop the band entirely.
pub fn compose(tickets: &[Ticket]) -> Option<String> {
    let announcements: Vec<String> = tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Called)
        .filter_map(|t| {
            let terminal = t.assigned_terminal_name.as_deref()?;
            Some(format!("{} please go to {terminal}", t.team_name))
        })
        .collect();

    if announcements.is_empty() {
        None
    } else {
        Some(announcements.join(SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::fixtures::ticket;
    use crate::model::TicketStatus::{Called, InProgress, Queued};

    fn called_at(id: &str, team: &str, terminal_name: &str) -> Ticket {
        let mut t = ticket(id, team, Called, Some("x"));
        t.assigned_terminal_name = Some(terminal_name.into());
        t
    }

    #[test]
    fn announces_called_tickets_only() {
        let tickets = vec![
            called_at("a", "Alpha", "T1"),
            ticket("b", "Beta", Queued, Some("x")),
        ];

        assert_eq!(compose(&tickets).as_deref(), Some("Alpha please go to T1"));
    }

    #[test]
    fn absent_without_called_tickets() {
        let tickets = vec![
            ticket("a", "Alpha", Queued, Some("x")),
            ticket("b", "Beta", InProgress, Some("x")),
        ];

        assert_eq!(compose(&tickets), None);
        assert_eq!(compose(&[]), None);
    }

    #[test]
    fn joins_in_snapshot_order() {
        let tickets = vec![
            called_at("b", "Beta", "T2"),
            called_at("a", "Alpha", "T1"),
        ];

        assert_eq!(
            compose(&tickets).as_deref(),
            Some("Beta please go to T2 ••• Alpha please go to T1")
        );
    }

    #[test]
    fn skips_called_tickets_without_terminal_name() {
        let mut nameless = ticket("a", "Alpha", Called, Some("x"));
        nameless.assigned_terminal_name = None;

        assert_eq!(compose(&[nameless.clone()]), None);
        assert_eq!(
            compose(&[nameless, called_at("b", "Beta", "T2")]).as_deref(),
            Some("Beta please go to T2")
        );
    }
}
