//! Shared application state

use super::templates::Templates;
use crate::config::AppConfig;
use crate::core::auth::PasswordHasher;
use crate::core::locale::ExchangeRates;
use crate::core::service::{FacilityService, ReviewService, UserService};
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub facilities: Arc<dyn FacilityService>,
    pub users: Arc<dyn UserService>,
    pub reviews: Arc<dyn ReviewService>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
    pub rates: Arc<ExchangeRates>,
    pub templates: Arc<Templates>,
}
