//! Agent session cache — which devices are known and which are live.
//!
//! Populated by the agent transport (external to this crate); read by
//! the API and the ban enforcer. Multiple devices may legitimately
//! share a public address (agents behind the same NAT), so lookups by
//! address can return several devices.

use std::sync::Arc;

use dashmap::DashMap;

/// A managed device as reported by its agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Stable device identifier.
    pub id: String,
    /// Public address the agent connects from.
    pub public_address: String,
}

#[derive(Debug, Clone)]
struct AgentSession {
    device: Device,
    /// Live connection id, if the agent is currently connected.
    connection_id: Option<String>,
}

/// Shared registry of devices and their live connections, keyed by
/// device id.
#[derive(Clone, Default)]
pub struct AgentSessionCache {
    sessions: Arc<DashMap<String, AgentSession>>,
}

impl AgentSessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a device, replacing any previous entry for its id.
    pub fn register(&self, device: Device, connection_id: Option<String>) {
        self.sessions.insert(
            device.id.clone(),
            AgentSession {
                device,
                connection_id,
            },
        );
    }

    /// Mark a device's connection as gone. The device stays known.
    pub fn remove_connection(&self, device_id: &str) {
        if let Some(mut session) = self.sessions.get_mut(device_id) {
            session.connection_id = None;
        }
    }

    /// Forget a device entirely.
    pub fn remove(&self, device_id: &str) {
        self.sessions.remove(device_id);
    }

    /// Every device the cache knows about.
    pub fn all_devices(&self) -> Vec<Device> {
        self.sessions.iter().map(|s| s.device.clone()).collect()
    }

    /// Live connection ids for the given device ids. Devices without an
    /// active connection are skipped.
    pub fn connection_ids_for(&self, device_ids: &[String]) -> Vec<String> {
        device_ids
            .iter()
            .filter_map(|id| self.sessions.get(id))
            .filter_map(|s| s.connection_id.clone())
            .collect()
    }

    /// Number of devices with a live connection.
    pub fn connected_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.connection_id.is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
