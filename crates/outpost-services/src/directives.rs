//! Directive hub — best-effort push messaging to live agent connections.
//!
//! The transport layer attaches a channel per connection and forwards
//! whatever arrives on it. Broadcasts are fire-and-forget: a recipient
//! whose channel is gone is detached and skipped, never an error for
//! the sender.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

/// A one-way instruction pushed to a connected agent. No payload, no
/// response expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// The agent must uninstall itself.
    UninstallAgent,
}

/// Registry of per-connection directive channels.
#[derive(Clone, Default)]
pub struct DirectiveHub {
    links: Arc<DashMap<String, mpsc::UnboundedSender<Directive>>>,
}

impl DirectiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection; the transport drains the returned receiver.
    /// Re-attaching the same id replaces the previous channel.
    pub fn attach(&self, connection_id: &str) -> mpsc::UnboundedReceiver<Directive> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.links.insert(connection_id.to_string(), tx);
        rx
    }

    /// Drop a connection's channel.
    pub fn detach(&self, connection_id: &str) {
        self.links.remove(connection_id);
    }

    /// Push a directive to each listed connection. Best-effort: returns
    /// how many recipients accepted it; closed or unknown connections
    /// are skipped.
    pub fn broadcast(&self, connection_ids: &[String], directive: Directive) -> usize {
        let mut delivered = 0;
        for id in connection_ids {
            let sent = match self.links.get(id) {
                Some(tx) => tx.send(directive).is_ok(),
                None => {
                    tracing::debug!(connection_id = %id, "no live link for directive target");
                    continue;
                }
            };
            if sent {
                delivered += 1;
            } else {
                // Receiver dropped without detaching. Clean up the link;
                // the guard from get() is out of scope here.
                self.links.remove(id);
                tracing::debug!(connection_id = %id, "directive link closed, detaching");
            }
        }
        delivered
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
