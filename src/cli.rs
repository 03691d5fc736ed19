//! CLI interface for the board.
//!
//! Two commands, both reading a feed directory (see [`crate::feed`]):
//!
//! - `queueboard watch <feed>`: live board, re-rendered on every snapshot.
//! - `queueboard snapshot <feed>`: replay the feed and print the final board as JSON.

mod format;
mod snapshot;
mod watch;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};

use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use crate::audio::{AudioOutput, Bell, CommandPlayer};
use crate::board::{Applied, Board};
use crate::config::Config;
use crate::feed::{self, Collection, Delivery, FeedOptions, Subscription};

/// Queueboard: live status board for a multi-terminal service queue.
#[derive(Debug, Parser)]
#[command(name = "queueboard", version, after_long_help = FEED_HELP)]
pub struct Cli {
    /// Config file to use instead of `~/.queueboard/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const FEED_HELP: &str = r#"Feed directory layout:
  <feed>/terminals.jsonl   one JSON array of terminals per line
  <feed>/tickets.jsonl     one JSON array of tickets per line

Each line is a full snapshot of its collection, e.g.
  [{"id":"t1","name":"Desk A","isOpen":true,"currentTicketId":"k2","queueOrder":["k2","k1"]}]
  [{"id":"k1","teamName":"Alpha","status":"queued","assignedTerminalId":"t1","assignedTerminalName":"Desk A"}]

Live board, appending snapshots from another process:
  queueboard watch ./feed --follow --sound"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the live board.
    ///
    /// Re-renders after every snapshot. Sound stays off until enabled with
    /// `--sound` or by pressing Enter.
    Watch {
        /// Feed directory.
        feed: PathBuf,

        /// Keep reading snapshots appended to the feed files.
        #[arg(long)]
        follow: bool,

        /// Enable the notification sound from the start.
        #[arg(long)]
        sound: bool,

        /// Pause between replayed snapshots, in milliseconds.
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
    },

    /// Replay a feed and print the final board as JSON.
    Snapshot {
        /// Feed directory.
        feed: PathBuf,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Watch {
            feed,
            follow,
            sound,
            interval_ms,
        } => watch::cmd_watch(&config, &feed, follow, sound, interval_ms),
        Command::Snapshot { feed } => snapshot::cmd_snapshot(&feed),
    }
}

/// Something the host loop reacts to.
#[derive(Debug)]
enum Event {
    /// A delivery from one of the feed subscriptions.
    Feed(Delivery),

    /// The user asked for sound.
    Consent,

    /// The user interrupted the board.
    Shutdown,
}

impl From<Delivery> for Event {
    fn from(delivery: Delivery) -> Self {
        Self::Feed(delivery)
    }
}

/// Subscribe to both collections of the feed in `dir`.
fn open_feed(dir: &Path, options: FeedOptions, tx: &Sender<Event>) -> Result<Vec<Subscription>, String> {
    if !dir.is_dir() {
        return Err(format!("feed directory not found: {}", dir.display()));
    }
    Collection::ALL
        .iter()
        .map(|&collection| {
            feed::subscribe(dir, collection, options, tx.clone())
                .map_err(|e| format!("failed to subscribe to {collection}: {e}"))
        })
        .collect()
}

/// The configured audio output, preloaded. Falls back to the bell.
fn open_audio(config: &Config) -> Box<dyn AudioOutput> {
    let Some(sound) = &config.sound else {
        return Box::new(Bell);
    };
    let player = config
        .player
        .clone()
        .unwrap_or_else(|| CommandPlayer::default_player().to_string());
    let mut output = CommandPlayer::new(player, sound.clone());
    match output.preload() {
        Ok(()) => Box::new(output),
        Err(e) => {
            warn!(error = %e, "notification sound unavailable, using terminal bell");
            Box::new(Bell)
        }
    }
}

/// Apply events in arrival order until `open` subscriptions have closed or
/// a shutdown arrives.
///
/// `on_change` runs after each event that changed what the board shows.
fn pump<A: AudioOutput>(
    rx: &Receiver<Event>,
    board: &mut Board<A>,
    mut open: usize,
    mut on_change: impl FnMut(&Board<A>),
) {
    while open > 0 {
        let Ok(event) = rx.recv() else {
            break;
        };
        match event {
            Event::Consent => {
                board.grant_consent();
                on_change(board);
            }
            Event::Shutdown => {
                debug!(open, "shutting down");
                break;
            }
            Event::Feed(delivery) => match board.apply(delivery) {
                Applied::Updated(_) => on_change(board),
                Applied::Kept => {}
                Applied::Closed(collection) => {
                    debug!(%collection, "feed closed");
                    open -= 1;
                }
            },
        }
    }
}
