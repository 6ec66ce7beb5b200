//! Parent reviews of a facility

use crate::core::user::not_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A review left for a facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub nursery_id: Uuid,
    pub user_id: Option<Uuid>,
    pub reviewer_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(nursery_id: Uuid, reviewer_name: impl Into<String>, rating: u8, comment: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            nursery_id,
            user_id: None,
            reviewer_name: reviewer_name.into(),
            rating,
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }

    pub fn by_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Wire form returned by the reviews API
    pub fn summary(&self) -> ReviewSummary {
        ReviewSummary {
            id: self.id,
            nursery_id: self.nursery_id,
            name: self.reviewer_name.clone(),
            rating: self.rating,
            comment: self.comment.clone(),
        }
    }
}

/// Flat JSON object returned by the reviews API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub id: Uuid,
    pub nursery_id: Uuid,
    pub name: String,
    pub rating: u8,
    pub comment: String,
}

/// Payload for submitting a review
///
/// When `reviewer_name` is omitted the author's username is used.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewForm {
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: u8,
    #[validate(
        custom(function = "not_blank", message = "Comment is required."),
        length(max = 2000, message = "Comment is too long.")
    )]
    pub comment: String,
}
