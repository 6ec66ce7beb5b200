//! Domain types, the catalog query engine and collaborator traits

pub mod auth;
pub mod catalog;
pub mod error;
pub mod facility;
pub mod locale;
pub mod query;
pub mod review;
pub mod service;
pub mod tags;
pub mod user;

pub use auth::{Argon2PasswordHasher, Identity, PasswordHasher, RequestContext};
pub use error::{AppError, AppResult};
pub use facility::{Facility, FacilityDetails, FacilityRecord, FacilitySummary};
pub use locale::{Currency, ExchangeRates, Language};
pub use query::{CatalogParams, CatalogQuery, SortKey};
pub use review::{Review, ReviewForm, ReviewSummary};
pub use service::{FacilityService, ReviewService, UserService};
pub use user::User;
