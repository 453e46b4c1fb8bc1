//! Helpdesk Ticket Visibility Engine
//!
//! Decides which tickets an authenticated actor may see, and narrows that
//! set with caller-supplied filters without one filter erasing another.
//!
//! ## Architecture
//!
//! - **Domain Layer**: value objects, the predicate tree, role policy,
//!   filter merging, category equivalence, SLA classification
//! - **Application Layer**: request validation and the listing pipeline
//! - **Ports Layer**: the listing use case and its read-only collaborators
//! - **Infrastructure Layer**: in-memory collaborators
//!
//! ## Pipeline
//!
//! actor lookup → visibility grant → filter merge (+ category equivalence)
//! → store query → SLA classification → page or stats

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenience
pub use application::{FilterRequest, ListOutcome, TicketListingService, TicketPage, TicketStats};
pub use domain::predicate::{Field, Predicate, Value};
pub use domain::services::{FilterMerger, SlaClassifier, VisibilityGrant, VisibilityPolicy};
pub use domain::value_objects::{Role, SlaBucket, SupportGroupCode, UserId, WorkbenchFilter};
pub use ports::inbound::TicketListing;
pub use ports::outbound::{ActorDirectory, ApprovalCatalog, CategoryCatalog, TicketQueryExecutor};
