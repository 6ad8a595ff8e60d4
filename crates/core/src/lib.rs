//! Domain model for the SaaS Probe client.
//!
//! Serde types for every resource of the validation backend's REST
//! contract, plus the pure presentation values derived from them (status
//! badges, score tiers, usage meters, keyword parsing, the plan catalog).
//! Nothing in this crate performs I/O.

pub mod analysis;
pub mod error;
pub mod format;
pub mod plans;
pub mod project;
pub mod subscription;
pub mod timestamp;
pub mod types;
pub mod user;
