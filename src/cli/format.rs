//! Plain-text rendering of the board for terminal display.

use std::fmt::Write;

use crate::board::BoardView;
use crate::queue::{CallState, TerminalView};

/// Shown instead of an empty grid.
const NO_TERMINALS: &str = "No support terminals are currently configured.";

/// Render the whole board: title, marquee, sound hint, then one card per terminal.
pub(super) fn format_board(view: &BoardView<'_>, title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));

    if let Some(marquee) = &view.marquee {
        let _ = writeln!(out, ">>> {marquee}");
    }
    if view.consent_required {
        let _ = writeln!(out, "(sound off: press Enter to enable)");
    }

    if view.terminals.is_empty() {
        let _ = writeln!(out, "\n{NO_TERMINALS}");
        return out;
    }

    for terminal in &view.terminals {
        out.push('\n');
        out.push_str(&format_terminal(terminal));
    }
    out
}

/// Render one terminal card.
pub(super) fn format_terminal(view: &TerminalView<'_>) -> String {
    let mut out = String::new();
    let state = if view.is_open { "Open" } else { "Closed" };
    let _ = writeln!(out, "[ {} ({state}) ]", view.name);

    if !view.is_open {
        let _ = writeln!(out, "  Terminal Closed");
        return out;
    }

    if let Some(current) = &view.current {
        let _ = write!(
            out,
            "  {}: {}",
            current.state.label(),
            current.ticket.team_name
        );
        if current.state == CallState::Serving {
            out.push_str(" (Support In Progress)");
        }
        out.push('\n');
    }

    if !view.waiting.is_empty() {
        let _ = writeln!(out, "  Queue:");
        for entry in &view.waiting {
            let _ = writeln!(out, "    {}. {}", entry.position, entry.ticket.team_name);
        }
    }

    if view.is_idle() {
        let _ = writeln!(out, "  Queue is empty.");
    }
    out
}
