//! `queueboard snapshot`: replay a feed and print the final board.

use std::path::Path;
use std::sync::mpsc;

use crate::audio::Bell;
use crate::board::Board;
use crate::feed::FeedOptions;

use super::{open_feed, pump};

pub(super) fn cmd_snapshot(feed: &Path) -> Result<(), String> {
    let json = snapshot_json(feed)?;
    println!("{json}");
    Ok(())
}

/// Replay both collections to the end and serialize the resulting view.
///
/// Sound is never enabled here, so the bell is only a placeholder.
fn snapshot_json(feed: &Path) -> Result<String, String> {
    let (tx, rx) = mpsc::channel();
    let subscriptions = open_feed(feed, FeedOptions::default(), &tx)?;
    drop(tx);

    let mut board = Board::new(Bell);
    pump(&rx, &mut board, subscriptions.len(), |_| {});
    for subscription in subscriptions {
        subscription.unsubscribe();
    }

    serde_json::to_string_pretty(&board.view())
        .map_err(|e| format!("failed to serialize board: {e}"))
}
