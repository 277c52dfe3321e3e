//! outpost-core: configuration shared by the daemon and services.

pub mod config;
