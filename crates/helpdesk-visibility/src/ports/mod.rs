//! Ports module (Hexagonal Architecture)
//!
//! The listing use case the engine exposes, and the collaborators it needs.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
