//! `queueboard watch`: the live board.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use jiff::tz::TimeZone;

use crate::board::Board;
use crate::config::Config;
use crate::feed::FeedOptions;

use super::format::format_board;
use super::{Event, open_audio, open_feed, pump};

pub(super) fn cmd_watch(
    config: &Config,
    feed: &Path,
    follow: bool,
    sound: bool,
    interval_ms: u64,
) -> Result<(), String> {
    let options = FeedOptions {
        follow,
        interval: Duration::from_millis(interval_ms),
        poll: config.poll_interval(),
    };

    let (tx, rx) = mpsc::channel();
    let subscriptions = open_feed(feed, options, &tx)?;

    let mut board = Board::new(open_audio(config));
    if sound {
        board.grant_consent();
    } else if io::stdin().is_terminal() {
        listen_for_consent(tx.clone());
    }
    stop_on_interrupt(tx);

    let clear = follow && io::stdout().is_terminal();
    pump(&rx, &mut board, subscriptions.len(), |board| {
        if clear {
            print!("\x1b[2J\x1b[H");
        }
        let view = board.view();
        print!("{}", format_board(&view, &config.title));
        if let Some(at) = view.updated_at {
            let local = at.to_zoned(TimeZone::system());
            println!("\nUpdated {}", local.strftime("%H:%M:%S"));
        }
        println!();
    });

    for subscription in subscriptions {
        subscription.unsubscribe();
    }
    Ok(())
}

/// Stop the board on the first interrupt; exit at once on the second.
fn stop_on_interrupt(tx: Sender<Event>) {
    let interrupted = AtomicBool::new(false);
    let installed = ctrlc::set_handler(move || {
        if interrupted.swap(true, Ordering::SeqCst) {
            process::exit(130);
        }
        let _ = tx.send(Event::Shutdown);
    });
    if let Err(e) = installed {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }
}

/// Grant consent when the user presses Enter.
///
/// The thread blocks on stdin and is left behind when the board exits.
fn listen_for_consent(tx: Sender<Event>) {
    let spawned = thread::Builder::new()
        .name("consent".to_string())
        .spawn(move || {
            let mut line = String::new();
            if matches!(io::stdin().read_line(&mut line), Ok(n) if n > 0) {
                let _ = tx.send(Event::Consent);
            }
        });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not listen for Enter; use --sound to enable sound");
    }
}
