pub mod handler;
pub mod messages;

use dashmap::DashMap;
use tokio::sync::broadcast;

pub use handler::handle_campaign_feed;
use messages::ServerMessage;

/// Events buffered per campaign before a slow spectator starts lagging
const FEED_CAPACITY: usize = 64;

/// Broadcast channels keyed by campaign code. A channel exists while
/// anyone is watching; the cleanup task drops the rest.
#[derive(Debug, Default)]
pub struct LiveFeeds {
    channels: DashMap<String, broadcast::Sender<ServerMessage>>,
}

impl LiveFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, campaign_code: &str) -> broadcast::Receiver<ServerMessage> {
        self.channels
            .entry(campaign_code.to_string())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }

    /// Push an event to everyone watching. Returns how many received it.
    pub fn publish(&self, campaign_code: &str, message: ServerMessage) -> usize {
        match self.channels.get(campaign_code) {
            Some(sender) => sender.send(message).unwrap_or(0),
            None => 0,
        }
    }

    pub fn subscriber_count(&self, campaign_code: &str) -> usize {
        self.channels
            .get(campaign_code)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop channels nobody listens to. Returns how many were removed.
    pub fn prune_idle(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, sender| sender.receiver_count() > 0);
        before - self.channels.len()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
