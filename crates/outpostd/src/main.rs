//! outpostd — agent update distribution daemon.
//!
//! Composition root: every service is constructed here with an explicit
//! lifetime and handed to the API by clone. Nothing in the process is
//! global state.

use std::time::Duration;

use anyhow::Result;

use outpost_core::config::OutpostConfig;
use outpost_services::{
    AdmissionGate, AgentSessionCache, BanEnforcer, DirectiveHub, PackageStore, ReservationStore,
};

/// How often the background sweeper purges expired reservations.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = OutpostConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = OutpostConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        OutpostConfig::default()
    });

    tracing::info!(
        max_concurrent = config.updates.max_concurrent,
        ttl_secs = config.updates.reservation_ttl_secs,
        banned = config.bans.banned_addresses.len(),
        "outpostd starting"
    );

    // Shared state
    let reservations = ReservationStore::new();
    let sessions = AgentSessionCache::new();
    let directives = DirectiveHub::new();

    let max_wait = match config.updates.max_wait_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let gate = AdmissionGate::new(reservations.clone(), config.updates.max_concurrent)
        .with_max_wait(max_wait);

    let bans = BanEnforcer::new(
        config.bans.banned_addresses.iter().cloned(),
        sessions.clone(),
        directives.clone(),
    );

    let packages = PackageStore::new(&config.updates.package_root);
    tracing::info!(root = %packages.root().display(), "package store initialized");

    // Expired reservations are reclaimed even if nobody reads the store.
    let _sweeper = reservations.spawn_sweeper(SWEEP_INTERVAL);

    let state = outpost_api::ApiState {
        reservations,
        gate,
        bans,
        packages,
        sessions,
        reservation_ttl: Duration::from_secs(config.updates.reservation_ttl_secs),
    };

    outpost_api::serve(state, config.network.api_port).await
}
