//! # Nursery Finder
//!
//! A web service for browsing childcare facilities ("nurseries"): parents
//! register, log in, search and filter the catalog, read and write reviews
//! and pick the currency prices are shown in.
//!
//! ## Features
//!
//! - **Catalog Query Engine**: pure, stable filter-and-sort over facility
//!   records ([`core::catalog::query`])
//! - **JSON API**: `/api/nurseries`, `/api/reviews` and per-facility reviews
//! - **HTML pages**: login, sign-up, catalog, detail and profile pages in
//!   English, German and Arabic
//! - **Legacy records**: seed data in either historical record shape is
//!   normalized at load time
//! - **Pluggable storage**: handlers depend on async service traits; the
//!   crate ships in-memory implementations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nursery::prelude::*;
//!
//! let facilities = seed::demo_facilities()?;
//!
//! ServerBuilder::new()
//!     .with_config(AppConfig::from_env()?)
//!     .with_facility_service(InMemoryFacilityService::with_facilities(facilities))
//!     .serve()
//!     .await?;
//! ```
//!
//! ## Querying the catalog directly
//!
//! ```rust,ignore
//! use nursery::prelude::*;
//!
//! let descriptor = CatalogQuery::new("berlin", "Montessori", SortKey::FeeAsc);
//! let ordered = catalog::query(&facilities, &descriptor);
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod session;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{Argon2PasswordHasher, Identity, PasswordHasher, RequestContext},
        catalog,
        error::{AppError, AppResult},
        facility::{Facility, FacilityDetails, FacilityRecord, FacilitySummary},
        locale::{Currency, ExchangeRates, Language},
        query::{CatalogParams, CatalogQuery, SortKey},
        review::{Review, ReviewForm, ReviewSummary},
        service::{FacilityService, ReviewService, UserService},
        user::User,
    };

    // === Storage ===
    pub use crate::storage::{
        InMemoryFacilityService, InMemoryReviewService, InMemoryUserService, seed,
    };

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};
    pub use crate::session::SessionStore;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use uuid::Uuid;
}
