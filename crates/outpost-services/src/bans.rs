//! Ban enforcement — rejects denylisted addresses and tells their
//! agents to uninstall.
//!
//! The denylist comes from configuration and is immutable here. A
//! banned address may cover several devices (NAT), so a single hit can
//! fan out to many connections. The uninstall broadcast is best-effort
//! and completes before the decision is returned, so a denied request
//! never reaches admission control.

use std::collections::HashSet;
use std::sync::Arc;

use crate::directives::{Directive, DirectiveHub};
use crate::sessions::AgentSessionCache;

/// Outcome of a ban check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

impl Decision {
    pub fn is_denied(self) -> bool {
        matches!(self, Decision::Denied)
    }
}

/// Checks requester addresses against the denylist.
#[derive(Clone)]
pub struct BanEnforcer {
    banned: Arc<HashSet<String>>,
    sessions: AgentSessionCache,
    directives: DirectiveHub,
}

impl BanEnforcer {
    pub fn new(
        banned: impl IntoIterator<Item = String>,
        sessions: AgentSessionCache,
        directives: DirectiveHub,
    ) -> Self {
        Self {
            banned: Arc::new(banned.into_iter().collect()),
            sessions,
            directives,
        }
    }

    /// Decide whether a request from `remote_addr` may proceed.
    ///
    /// A missing or blank address is allowed — requests without network
    /// metadata fail open. A denylisted address is denied, and every
    /// currently-connected device recorded under that address is sent
    /// an uninstall directive before this returns.
    pub fn check(&self, remote_addr: Option<&str>) -> Decision {
        let addr = match remote_addr {
            Some(a) if !a.trim().is_empty() => a,
            _ => return Decision::Allowed,
        };

        if !self.banned.contains(addr) {
            return Decision::Allowed;
        }

        tracing::info!(addr, "address is banned, sending uninstall directive");

        let device_ids: Vec<String> = self
            .sessions
            .all_devices()
            .into_iter()
            .filter(|d| d.public_address == addr)
            .map(|d| d.id)
            .collect();
        let connection_ids = self.sessions.connection_ids_for(&device_ids);

        let delivered = self
            .directives
            .broadcast(&connection_ids, Directive::UninstallAgent);
        tracing::debug!(
            addr,
            targets = connection_ids.len(),
            delivered,
            "uninstall directive broadcast"
        );

        Decision::Denied
    }
}
