//! Per-request context injected by middleware
//!
//! [`page_context`] and [`api_context`] resolve the session cookie into a
//! [`RequestContext`] and store it in the request extensions, where the
//! [`RequestContext`] extractor picks it up. A cookieless page request only
//! gets a session when `?lang=` has to be remembered; API requests never
//! start one.

use super::state::AppState;
use crate::core::auth::{Identity, RequestContext};
use crate::core::error::AppError;
use crate::core::locale::Language;
use crate::session::{
    SessionData, SessionError, attach_cookie, session_id_from_headers, sets_session_cookie,
};
use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::convert::Infallible;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
struct LangParam {
    lang: Option<String>,
}

/// Middleware for page routes: starts a session to remember `?lang=`
pub async fn page_context(State(state): State<AppState>, req: Request, next: Next) -> Response {
    with_context(state, req, next, true).await
}

/// Middleware for JSON routes: reads an existing session only
pub async fn api_context(State(state): State<AppState>, req: Request, next: Next) -> Response {
    with_context(state, req, next, false).await
}

async fn with_context(state: AppState, mut req: Request, next: Next, create: bool) -> Response {
    let requested = Query::<LangParam>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(param)| param.lang)
        .and_then(|lang| lang.parse::<Language>().ok())
        .filter(|lang| state.config.locale.is_enabled(*lang));

    let (ctx, created) = match resolve(&state, req.headers(), requested, create) {
        Ok(resolved) => resolved,
        Err(err) => return AppError::from(err).into_response(),
    };
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;
    if let Some(id) = created.filter(|_| !sets_session_cookie(response.headers())) {
        if let Err(err) = attach_cookie(response.headers_mut(), &id, false) {
            return AppError::from(err).into_response();
        }
    }
    response
}

/// Build the request context, returning the id of a newly created session
fn resolve(
    state: &AppState,
    headers: &HeaderMap,
    requested: Option<Language>,
    create: bool,
) -> Result<(RequestContext, Option<Uuid>), SessionError> {
    let live = match session_id_from_headers(headers) {
        Some(id) => state.sessions.touch(&id)?.map(|data| (id, data)),
        None => None,
    };

    let remember = |id: &Uuid, lang: Language| {
        state.sessions.update(id, |data| {
            data.language = Some(lang);
            data.clone()
        })
    };

    let (session_id, data, created) = match (live, requested) {
        (Some((id, _)), Some(lang)) => (Some(id), remember(&id, lang)?, None),
        (Some((id, data)), None) => (Some(id), data, None),
        (None, Some(lang)) if create => {
            let id = state.sessions.create()?;
            (Some(id), remember(&id, lang)?, Some(id))
        }
        (None, _) => (None, SessionData::default(), None),
    };

    let identity = match (data.user_id, data.user_name) {
        (Some(user_id), Some(username)) => Identity::User { user_id, username },
        _ => Identity::Anonymous,
    };

    let ctx = RequestContext {
        identity,
        language: requested
            .or(data.language)
            .unwrap_or(state.config.locale.default_language),
        currency: data.currency.unwrap_or(state.config.currency.default),
        session_id,
    };
    Ok((ctx, created))
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(RequestContext::anonymous))
    }
}
