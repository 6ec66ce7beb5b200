//! JSON API handlers

use super::{parse_id, require_user};
use crate::core::auth::RequestContext;
use crate::core::catalog;
use crate::core::error::{AppError, AppResult, RequestError, ValidationError};
use crate::core::facility::FacilitySummary;
use crate::core::locale::Currency;
use crate::core::query::CatalogParams;
use crate::core::review::{Review, ReviewForm, ReviewSummary};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

/// GET /api/nurseries?q=&curriculum=&sort=
pub async fn list_nurseries(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> AppResult<Json<Vec<FacilitySummary>>> {
    let descriptor = params.to_query();
    let dataset = state.facilities.list().await?;
    let result = catalog::query(&dataset, &descriptor);
    Ok(Json(result.into_iter().map(|f| f.summary()).collect()))
}

/// GET /api/nurseries/{id}
pub async fn get_nursery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FacilitySummary>> {
    let id = parse_id("nursery", &id)?;
    let facility = state
        .facilities
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("nursery", id))?;
    Ok(Json(facility.summary()))
}

/// GET /api/reviews
pub async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<ReviewSummary>>> {
    let reviews = state.reviews.list().await?;
    Ok(Json(reviews.iter().map(Review::summary).collect()))
}

/// GET /api/nurseries/{id}/reviews
pub async fn list_nursery_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ReviewSummary>>> {
    let id = parse_id("nursery", &id)?;
    if state.facilities.get(&id).await?.is_none() {
        return Err(AppError::not_found("nursery", id));
    }
    let reviews = state.reviews.list_for_nursery(&id).await?;
    Ok(Json(reviews.iter().map(Review::summary).collect()))
}

/// POST /api/nurseries/{id}/reviews
///
/// Requires a logged-in session. The reviewer name defaults to the
/// username.
pub async fn create_review(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    body: Result<Json<ReviewForm>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ReviewSummary>)> {
    let (user_id, username) = require_user(&ctx).ok_or_else(|| RequestError::Unauthorized {
        message: "log in to write a review".to_string(),
    })?;
    let Json(form) = body.map_err(|e| RequestError::InvalidBody {
        message: e.body_text(),
    })?;
    form.validate()?;

    let id = parse_id("nursery", &id)?;
    if state.facilities.get(&id).await?.is_none() {
        return Err(AppError::not_found("nursery", id));
    }

    let reviewer = form
        .reviewer_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(username.as_str())
        .to_string();

    let review = Review::new(id, reviewer, form.rating, form.comment.trim()).by_user(user_id);
    let review = state.reviews.create(review).await?;
    state.facilities.record_review(&id).await?;

    tracing::info!(nursery_id = %id, review_id = %review.id, "Review submitted");
    Ok((StatusCode::CREATED, Json(review.summary())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurrencyRequest {
    pub currency: Option<String>,
}

/// POST /set-currency with `{"currency": "usd"}`
///
/// Answers `{"ok": true}` or `{"ok": false, "error": <code>}`.
pub async fn set_currency(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<CurrencyRequest>, JsonRejection>,
) -> Response {
    match apply_currency(&state, &ctx, body).await {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => currency_error(err),
    }
}

async fn apply_currency(
    state: &AppState,
    ctx: &RequestContext,
    body: Result<Json<CurrencyRequest>, JsonRejection>,
) -> AppResult<()> {
    let (Some(session_id), Some((user_id, _))) = (ctx.session_id, require_user(ctx)) else {
        return Err(RequestError::Unauthorized {
            message: "log in to change the currency".to_string(),
        }
        .into());
    };

    let raw = body
        .ok()
        .and_then(|Json(request)| request.currency)
        .unwrap_or_default();
    let currency: Currency = raw.parse().map_err(|_| ValidationError::Unsupported {
        field: "currency".to_string(),
        value: raw.clone(),
    })?;

    state
        .sessions
        .update(&session_id, |data| data.currency = Some(currency))?;

    if let Some(mut user) = state.users.get(&user_id).await? {
        user.preferred_currency = currency;
        user.touch();
        state.users.update(user).await?;
    }
    Ok(())
}

fn currency_error(err: AppError) -> Response {
    let body: Value = json!({ "ok": false, "error": err.error_code() });
    if err.status_code().is_server_error() {
        return err.into_response();
    }
    (err.status_code(), Json(body)).into_response()
}
