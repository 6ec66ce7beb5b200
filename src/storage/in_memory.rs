//! In-memory implementations of the storage collaborators
//!
//! Every store keeps its records in an `IndexMap` so listing returns them in
//! insertion order. Uses RwLock for thread-safe access.

use crate::core::error::{EntityError, StorageError};
use crate::core::facility::Facility;
use crate::core::review::Review;
use crate::core::service::{FacilityService, ReviewService, UserService};
use crate::core::user::User;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type Table<T> = Arc<RwLock<IndexMap<Uuid, T>>>;

fn read<'a, T>(table: &'a Table<T>, store: &str) -> Result<RwLockReadGuard<'a, IndexMap<Uuid, T>>> {
    table.read().map_err(|_| {
        anyhow!(StorageError::LockPoisoned {
            store: store.to_string(),
        })
    })
}

fn write<'a, T>(
    table: &'a Table<T>,
    store: &str,
) -> Result<RwLockWriteGuard<'a, IndexMap<Uuid, T>>> {
    table.write().map_err(|_| {
        anyhow!(StorageError::LockPoisoned {
            store: store.to_string(),
        })
    })
}

// =============================================================================
// Facilities
// =============================================================================

/// In-memory facility catalog
#[derive(Clone, Default)]
pub struct InMemoryFacilityService {
    facilities: Table<Facility>,
}

impl InMemoryFacilityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-filled with `facilities`, keeping their order
    pub fn with_facilities(facilities: impl IntoIterator<Item = Facility>) -> Self {
        let map = facilities.into_iter().map(|f| (f.id, f)).collect();
        Self {
            facilities: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl FacilityService for InMemoryFacilityService {
    async fn list(&self) -> Result<Vec<Facility>> {
        let facilities = read(&self.facilities, "facility")?;
        Ok(facilities.values().cloned().collect())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Facility>> {
        let facilities = read(&self.facilities, "facility")?;
        Ok(facilities.get(id).cloned())
    }

    async fn create(&self, facility: Facility) -> Result<Facility> {
        let mut facilities = write(&self.facilities, "facility")?;
        facilities.insert(facility.id, facility.clone());
        Ok(facility)
    }

    async fn record_review(&self, id: &Uuid) -> Result<Option<Facility>> {
        let mut facilities = write(&self.facilities, "facility")?;
        Ok(facilities.get_mut(id).map(|facility| {
            facility.reviews_count = facility.reviews_count.saturating_add(1);
            facility.clone()
        }))
    }
}

// =============================================================================
// Users
// =============================================================================

/// In-memory user accounts
#[derive(Clone, Default)]
pub struct InMemoryUserService {
    users: Table<User>,
}

impl InMemoryUserService {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Name of the field `user` shares with another stored account
fn taken_field(users: &IndexMap<Uuid, User>, user: &User) -> Option<&'static str> {
    let others = || users.values().filter(|u| u.id != user.id);
    if others().any(|u| u.username == user.username) {
        Some("username")
    } else if others().any(|u| u.email == user.email) {
        Some("email")
    } else {
        None
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn create(&self, user: User) -> Result<User> {
        let mut users = write(&self.users, "user")?;
        if let Some(field) = taken_field(&users, &user) {
            return Err(anyhow!(EntityError::AlreadyExists {
                entity_type: "user".to_string(),
                field: field.to_string(),
            }));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<User>> {
        let users = read(&self.users, "user")?;
        Ok(users.get(id).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let users = read(&self.users, "user")?;
        Ok(users
            .values()
            .find(|u| u.username == identifier || u.email == identifier)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User> {
        let mut users = write(&self.users, "user")?;
        if let Some(field) = taken_field(&users, &user) {
            return Err(anyhow!(EntityError::AlreadyExists {
                entity_type: "user".to_string(),
                field: field.to_string(),
            }));
        }
        let slot = users
            .get_mut(&user.id)
            .ok_or_else(|| anyhow!("User not found"))?;
        *slot = user.clone();
        Ok(user)
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// In-memory reviews
#[derive(Clone, Default)]
pub struct InMemoryReviewService {
    reviews: Table<Review>,
}

impl InMemoryReviewService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewService for InMemoryReviewService {
    async fn create(&self, review: Review) -> Result<Review> {
        let mut reviews = write(&self.reviews, "review")?;
        reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn list(&self) -> Result<Vec<Review>> {
        let reviews = read(&self.reviews, "review")?;
        Ok(reviews.values().cloned().collect())
    }

    async fn list_for_nursery(&self, nursery_id: &Uuid) -> Result<Vec<Review>> {
        let reviews = read(&self.reviews, "review")?;
        Ok(reviews
            .values()
            .filter(|r| &r.nursery_id == nursery_id)
            .cloned()
            .collect())
    }
}
