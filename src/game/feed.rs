use super::*;
use crate::*;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

/// Sending half of a player's live event stream.
pub type Feed = UnboundedSender<Event>;

/// Fan-out of match events to the feeds attached by its players.
/// Lives inside the match state, so publishing is ordered by the match lock.
#[derive(Debug, Default)]
pub struct Broadcast {
    feeds: HashMap<ID<Player>, Feed>,
}

impl Broadcast {
    /// Attaches a feed, handing back the one it replaced.
    pub fn attach(&mut self, player: ID<Player>, feed: Feed) -> Option<Feed> {
        self.feeds.insert(player, feed)
    }
    pub fn detach(&mut self, player: ID<Player>) -> Option<Feed> {
        self.feeds.remove(&player)
    }
    /// Pushes an event to every feed, pruning the ones whose stream is gone.
    pub fn publish(&mut self, event: &Event) {
        log::trace!("publishing {} to {} feeds", event, self.feeds.len());
        self.feeds.retain(|player, feed| {
            feed.send(event.clone())
                .inspect_err(|_| log::debug!("dropping closed feed of {}", player))
                .is_ok()
        });
    }
    /// Closes every feed, ending the streams on the other side.
    pub fn close(&mut self) {
        self.feeds.clear();
    }
    pub fn len(&self) -> usize {
        self.feeds.len()
    }
}
