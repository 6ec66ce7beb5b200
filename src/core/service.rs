//! Storage collaborator traits
//!
//! Handlers only see these traits; the in-memory implementations live in
//! [`crate::storage`].

use crate::core::facility::Facility;
use crate::core::review::Review;
use crate::core::user::User;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Service trait for the facility catalog
#[async_trait]
pub trait FacilityService: Send + Sync {
    /// All facilities in insertion order, unfiltered
    async fn list(&self) -> Result<Vec<Facility>>;

    /// Get a facility by ID
    async fn get(&self, id: &Uuid) -> Result<Option<Facility>>;

    /// Add a facility
    async fn create(&self, facility: Facility) -> Result<Facility>;

    /// Increment the review count of a facility
    ///
    /// Returns the updated facility, or `None` when the id is unknown.
    async fn record_review(&self, id: &Uuid) -> Result<Option<Facility>>;
}

/// Service trait for user accounts
#[async_trait]
pub trait UserService: Send + Sync {
    /// Store a new user
    async fn create(&self, user: User) -> Result<User>;

    /// Get a user by ID
    async fn get(&self, id: &Uuid) -> Result<Option<User>>;

    /// Find a user whose username or email equals `identifier`
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>>;

    /// Replace a stored user
    async fn update(&self, user: User) -> Result<User>;
}

/// Service trait for reviews
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Store a new review
    async fn create(&self, review: Review) -> Result<Review>;

    /// All reviews in submission order
    async fn list(&self) -> Result<Vec<Review>>;

    /// Reviews of one facility in submission order
    async fn list_for_nursery(&self, nursery_id: &Uuid) -> Result<Vec<Review>>;
}
