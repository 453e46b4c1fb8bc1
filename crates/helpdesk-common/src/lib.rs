//! Helpdesk Common - Shared plumbing for the helpdesk core
//!
//! This crate provides the pieces every helpdesk crate leans on:
//! - Error taxonomy (collaborator failures and typed request outcomes)
//! - Engine configuration (well-known categories, paging limits, SLA tuning)
//! - Tracing bootstrap
//!
//! Nothing in here knows about tickets or roles; the policy itself lives in
//! `helpdesk-visibility`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{EngineConfig, WellKnownCategories};
pub use error::*;
