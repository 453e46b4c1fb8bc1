//! Infrastructure layer
//!
//! Concrete adapters for the outbound ports.

pub mod memory;

pub use memory::*;
