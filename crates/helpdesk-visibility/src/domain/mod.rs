//! Domain module
//!
//! Value objects, the actor and ticket read models, the predicate tree and
//! the policy services built on them.

pub mod actor;
pub mod filter;
pub mod predicate;
pub mod services;
pub mod ticket;
pub mod value_objects;

pub use actor::*;
pub use filter::*;
pub use predicate::*;
pub use ticket::*;
pub use value_objects::*;
