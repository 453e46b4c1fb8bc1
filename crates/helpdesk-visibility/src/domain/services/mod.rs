//! Domain services
//!
//! Stateless policy objects. Only the category resolver touches a port.

pub mod category;
pub mod filter_merger;
pub mod sla;
pub mod visibility;

pub use category::{CategoryEquivalenceResolver, CategoryResolution};
pub use filter_merger::FilterMerger;
pub use sla::{SlaClassifier, SlaTally};
pub use visibility::{VisibilityContext, VisibilityGrant, VisibilityPolicy};
