//! Application layer
//!
//! Orchestrates the listing use case over the domain services and ports.

pub mod actor;
pub mod dto;
pub mod listing;

pub use actor::ActorResolver;
pub use dto::*;
pub use listing::TicketListingService;
