//! Storage implementations and seed loading

pub mod in_memory;
pub mod seed;

pub use in_memory::{InMemoryFacilityService, InMemoryReviewService, InMemoryUserService};
