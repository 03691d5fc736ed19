//! Record feed: live snapshots of terminals and tickets from a feed directory.
//!
//! The directory holds one file per collection:
//!
//! ```text
//! <feed>/
//!   terminals.jsonl   # one JSON array of terminals per line
//!   tickets.jsonl     # one JSON array of tickets per line
//! ```
//!
//! Every line is a full snapshot of its collection. Each subscription reads its
//! file on its own thread and sends deliveries into a channel owned by the host,
//! so the two collections arrive independently, each in file order.

use std::{
    fmt, fs,
    io::{self, BufRead, BufReader},
    mem,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::debug;

use crate::model::{Terminal, Ticket};

/// Errors that can occur while subscribing to or reading a feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed file not found: {0}")]
    NotFound(PathBuf),

    #[error("{collection} snapshot on line {line} is invalid: {source}")]
    Parse {
        collection: Collection,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, FeedError>;

/// The two record collections the board subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Terminals,
    Tickets,
}

impl Collection {
    pub const ALL: [Self; 2] = [Self::Terminals, Self::Tickets];

    fn file_name(self) -> &'static str {
        match self {
            Self::Terminals => "terminals.jsonl",
            Self::Tickets => "tickets.jsonl",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Terminals => "terminals",
            Self::Tickets => "tickets",
        })
    }
}

/// One message from a subscription.
#[derive(Debug)]
pub enum Delivery {
    /// A full terminal snapshot, ordered by name.
    Terminals(Vec<Terminal>),

    /// A full snapshot of active tickets.
    Tickets(Vec<Ticket>),

    /// A snapshot that could not be delivered. The subscription keeps going.
    Failed {
        collection: Collection,
        error: FeedError,
    },

    /// The subscription has ended and will deliver nothing more.
    Closed(Collection),
}

/// How a subscription reads its file.
#[derive(Debug, Clone, Copy)]
pub struct FeedOptions {
    /// Keep waiting for appended lines instead of stopping at end of file.
    pub follow: bool,

    /// Pause after each delivery. Zero replays as fast as possible.
    pub interval: Duration,

    /// How often to look for new lines while following.
    pub poll: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            follow: false,
            interval: Duration::ZERO,
            poll: Duration::from_millis(250),
        }
    }
}

/// A live subscription to one collection.
///
/// Dropping it stops the reader thread and waits for it to finish.
pub struct Subscription {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop delivery and release the reader thread.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

/// Subscribe to one collection of the feed in `dir`.
///
/// The initial snapshots are whatever the file already holds; in follow mode every
/// line appended later is delivered too. Deliveries are converted into the host's
/// event type and sent on `tx`. The last message is always [`Delivery::Closed`].
pub fn subscribe<E>(
    dir: &Path,
    collection: Collection,
    options: FeedOptions,
    tx: Sender<E>,
) -> Result<Subscription>
where
    E: From<Delivery> + Send + 'static,
{
    let path = dir.join(collection.file_name());
    let file = match fs::File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(FeedError::NotFound(path)),
        Err(e) => return Err(e.into()),
    };

    let stop = Arc::new(AtomicBool::new(false));
    let reader = Reader {
        collection,
        options,
        stop: Arc::clone(&stop),
        lines: BufReader::new(file),
    };
    let handle = thread::Builder::new()
        .name(format!("feed-{collection}"))
        .spawn(move || reader.run(&tx))?;

    debug!(%collection, path = %path.display(), follow = options.follow, "subscribed");
    Ok(Subscription {
        stop,
        handle: Some(handle),
    })
}

struct Reader {
    collection: Collection,
    options: FeedOptions,
    stop: Arc<AtomicBool>,
    lines: BufReader<fs::File>,
}

impl Reader {
    fn run<E: From<Delivery>>(mut self, tx: &Sender<E>) {
        // Raw bytes: a line is only decoded once its newline has arrived.
        let mut buf = Vec::new();
        let mut line_number = 0;

        while !self.stopped() {
            let read = match self.lines.read_until(b'\n', &mut buf) {
                Ok(n) => n,
                Err(error) => {
                    let failed = Delivery::Failed {
                        collection: self.collection,
                        error: error.into(),
                    };
                    if tx.send(failed.into()).is_err() || !self.options.follow {
                        break;
                    }
                    thread::park_timeout(self.options.poll);
                    continue;
                }
            };

            let at_eof = read == 0 || buf.last() != Some(&b'\n');
            if at_eof && self.options.follow {
                // Wait for the rest of a partially written line, or for new lines.
                thread::park_timeout(self.options.poll);
                continue;
            }
            if buf.is_empty() {
                break;
            }

            line_number += 1;
            let line = mem::take(&mut buf);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let delivery = parse_snapshot(self.collection, &line, line_number);
            if tx.send(delivery.into()).is_err() {
                break;
            }
            if !self.options.interval.is_zero() {
                thread::park_timeout(self.options.interval);
            }
        }

        debug!(collection = %self.collection, "subscription closed");
        let _ = tx.send(Delivery::Closed(self.collection).into());
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Parse one snapshot line, applying the collection's query shape.
///
/// Terminals are ordered by name. Tickets are limited to active statuses.
fn parse_snapshot(collection: Collection, line: &[u8], line_number: usize) -> Delivery {
    let failed = |source| Delivery::Failed {
        collection,
        error: FeedError::Parse {
            collection,
            line: line_number,
            source,
        },
    };

    match collection {
        Collection::Terminals => match serde_json::from_slice::<Vec<Terminal>>(line) {
            Ok(mut terminals) => {
                terminals.sort_by(|a, b| a.name.cmp(&b.name));
                Delivery::Terminals(terminals)
            }
            Err(e) => failed(e),
        },
        Collection::Tickets => match serde_json::from_slice::<Vec<Ticket>>(line) {
            Ok(mut tickets) => {
                tickets.retain(Ticket::is_active);
                Delivery::Tickets(tickets)
            }
            Err(e) => failed(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::sync::mpsc::{self, Receiver};

    use tempfile::TempDir;

    use crate::model::TicketStatus;

    fn feed_dir(terminals: &str, tickets: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("terminals.jsonl"), terminals).unwrap();
        fs::write(dir.path().join("tickets.jsonl"), tickets).unwrap();
        dir
    }

    /// Everything a subscription delivers up to and including `Closed`.
    fn drain(rx: &Receiver<Delivery>) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        loop {
            let delivery = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            let closed = matches!(delivery, Delivery::Closed(_));
            deliveries.push(delivery);
            if closed {
                return deliveries;
            }
        }
    }

    #[test]
    fn replays_terminal_snapshots_sorted_by_name() {
        let dir = feed_dir(
            concat!(
                r#"[{"id":"b","name":"Desk B","isOpen":true},{"id":"a","name":"Desk A","isOpen":true}]"#,
                "\n",
                r#"[]"#,
                "\n",
            ),
            "",
        );
        let (tx, rx) = mpsc::channel();

        let _sub = subscribe(dir.path(), Collection::Terminals, FeedOptions::default(), tx).unwrap();
        let deliveries = drain(&rx);

        assert_eq!(deliveries.len(), 3);
        match &deliveries[0] {
            Delivery::Terminals(terminals) => {
                let names: Vec<&str> = terminals.iter().map(|t| t.name.as_str()).collect();
                assert_eq!(names, vec!["Desk A", "Desk B"]);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
        assert!(matches!(&deliveries[1], Delivery::Terminals(t) if t.is_empty()));
        assert!(matches!(deliveries[2], Delivery::Closed(Collection::Terminals)));
    }

    #[test]
    fn filters_inactive_tickets() {
        let dir = feed_dir(
            "",
            concat!(
                r#"[{"id":"1","teamName":"A","status":"queued"},"#,
                r#"{"id":"2","teamName":"B","status":"completed"},"#,
                r#"{"id":"3","teamName":"C","status":"waiting_assignment"},"#,
                r#"{"id":"4","teamName":"D","status":"in_progress"}]"#,
                "\n"
            ),
        );
        let (tx, rx) = mpsc::channel();

        let _sub = subscribe(dir.path(), Collection::Tickets, FeedOptions::default(), tx).unwrap();
        let deliveries = drain(&rx);

        match &deliveries[0] {
            Delivery::Tickets(tickets) => {
                let statuses: Vec<TicketStatus> = tickets.iter().map(|t| t.status).collect();
                assert_eq!(statuses, vec![TicketStatus::Queued, TicketStatus::InProgress]);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
    }

    #[test]
    fn malformed_line_fails_without_ending_subscription() {
        let dir = feed_dir(
            "",
            concat!(
                "[]\n",
                "\n",
                "{not json\n",
                r#"[{"id":"1","teamName":"A","status":"called"}]"#,
            ),
        );
        let (tx, rx) = mpsc::channel();

        let _sub = subscribe(dir.path(), Collection::Tickets, FeedOptions::default(), tx).unwrap();
        let deliveries = drain(&rx);

        assert_eq!(deliveries.len(), 4);
        assert!(matches!(deliveries[0], Delivery::Tickets(_)));
        match &deliveries[1] {
            Delivery::Failed {
                collection,
                error: FeedError::Parse { line, .. },
            } => {
                assert_eq!(*collection, Collection::Tickets);
                assert_eq!(*line, 3);
            }
            other => panic!("unexpected delivery: {other:?}"),
        }
        // The final line has no trailing newline and is still delivered.
        assert!(matches!(&deliveries[2], Delivery::Tickets(t) if t.len() == 1));
        assert!(matches!(deliveries[3], Delivery::Closed(_)));
    }

    #[test]
    fn missing_file_fails_at_subscribe() {
        let dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel::<Delivery>();

        let err = subscribe(dir.path(), Collection::Terminals, FeedOptions::default(), tx)
            .err()
            .unwrap();

        assert!(matches!(err, FeedError::NotFound(_)));
    }

    #[test]
    fn follow_delivers_appended_lines_until_dropped() {
        let dir = feed_dir("", "[]\n");
        let (tx, rx) = mpsc::channel();
        let options = FeedOptions {
            follow: true,
            poll: Duration::from_millis(10),
            ..FeedOptions::default()
        };

        let sub = subscribe(dir.path(), Collection::Tickets, options, tx).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(&first, Delivery::Tickets(t) if t.is_empty()));

        // Written in two parts: the half line must not be delivered on its own.
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join("tickets.jsonl"))
            .unwrap();
        file.write_all(br#"[{"id":"1","teamName":"A","#).unwrap();
        file.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        file.write_all(b"\"status\":\"queued\"}]\n").unwrap();
        file.flush().unwrap();

        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(&second, Delivery::Tickets(t) if t.len() == 1));

        sub.unsubscribe();
        let last = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(last, Delivery::Closed(Collection::Tickets)));
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn follow_holds_line_split_inside_a_character() {
        let dir = feed_dir("", "");
        let (tx, rx) = mpsc::channel();
        let options = FeedOptions {
            follow: true,
            poll: Duration::from_millis(10),
            ..FeedOptions::default()
        };

        let sub = subscribe(dir.path(), Collection::Tickets, options, tx).unwrap();

        // "Café" split between the two bytes of the 'é'.
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join("tickets.jsonl"))
            .unwrap();
        file.write_all(b"[{\"id\":\"1\",\"teamName\":\"Caf\xC3").unwrap();
        file.flush().unwrap();
        thread::sleep(Duration::from_millis(50));
        file.write_all(b"\xA9\",\"status\":\"queued\"}]\n").unwrap();
        file.flush().unwrap();

        let delivery = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        match &delivery {
            Delivery::Tickets(tickets) => {
                assert_eq!(tickets.len(), 1);
                assert_eq!(tickets[0].team_name, "Café");
            }
            other => panic!("unexpected delivery: {other:?}"),
        }

        sub.unsubscribe();
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            Delivery::Closed(Collection::Tickets)
        ));
    }
}
