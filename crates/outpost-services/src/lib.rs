//! outpost-services: the domain core of the update server.
//!
//! Everything here is an explicitly constructed, cloneable handle around
//! `Arc`-shared state. The composition root (`outpostd`) builds one of
//! each and hands clones to the API layer.

pub mod admission;
pub mod bans;
pub mod directives;
pub mod packages;
pub mod reservations;
pub mod sessions;

pub use admission::{AdmissionError, AdmissionGate, SlotGuard};
pub use bans::{BanEnforcer, Decision};
pub use directives::{Directive, DirectiveHub};
pub use packages::PackageStore;
pub use reservations::ReservationStore;
pub use sessions::{AgentSessionCache, Device};
