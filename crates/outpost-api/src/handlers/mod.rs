//! HTTP API handlers — the update distribution surface.

pub mod status;
pub mod updates;

use std::time::Duration;

use outpost_services::{
    AdmissionGate, AgentSessionCache, BanEnforcer, PackageStore, ReservationStore,
};

#[derive(Clone)]
pub struct ApiState {
    pub reservations: ReservationStore,
    pub gate: AdmissionGate,
    pub bans: BanEnforcer,
    pub packages: PackageStore,
    pub sessions: AgentSessionCache,
    /// TTL applied to each download reservation.
    pub reservation_ttl: Duration,
}

// Re-export handler functions for use in router setup.
pub use status::{handle_agents, handle_status};
pub use updates::{handle_clear_download, handle_download_package};
