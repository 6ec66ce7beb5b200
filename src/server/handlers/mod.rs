//! HTTP handlers
//!
//! - [`api`]: JSON endpoints under `/api` and `/set-currency`
//! - [`pages`]: HTML pages

pub mod api;
pub mod pages;

use crate::core::auth::RequestContext;
use crate::core::error::{AppError, AppResult};
use axum::Json;
use serde_json::{Value, json};
use uuid::Uuid;

/// Logged-in user id and name, `None` for anonymous requests
pub(crate) fn require_user(ctx: &RequestContext) -> Option<(Uuid, String)> {
    if !ctx.is_authenticated() {
        return None;
    }
    let user_id = ctx.identity.user_id()?;
    let username = ctx.identity.username()?.to_string();
    Some((user_id, username))
}

/// Parse a path id; ids that are not UUIDs cannot exist
pub(crate) fn parse_id(entity_type: &str, raw: &str) -> AppResult<Uuid> {
    raw.parse()
        .map_err(|_| AppError::not_found(entity_type, raw))
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "nursery-finder"
    }))
}
