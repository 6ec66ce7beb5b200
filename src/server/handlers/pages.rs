//! HTML page handlers
//!
//! Pages that need a logged-in user redirect anonymous visitors to
//! `/login`. Form errors re-render the form with a message.

use super::{parse_id, require_user};
use crate::core::auth::{Identity, RequestContext};
use crate::core::catalog;
use crate::core::error::{AppResult, EntityError};
use crate::core::locale::Currency;
use crate::core::query::{CatalogParams, SortKey};
use crate::core::review::Review;
use crate::core::user::{LoginForm, ProfileForm, SignupForm, User, first_message};
use crate::server::state::AppState;
use crate::server::templates::{FacilityCard, ProfileView, sort_label};
use crate::session::attach_cookie;
use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};
use validator::Validate;

const LOGIN_FAILED: &str = "Invalid username, email or password.";
const ACCOUNT_EXISTS: &str = "Username or email already exists.";
const PROFILE_TAKEN: &str = "Username or email is already taken by another user.";
const RESET_SENT: &str = "If this email exists, we have sent password reset instructions.";

/// GET /
pub async fn home() -> Redirect {
    Redirect::to("/login")
}

/// GET /about
pub async fn about(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Html<String>> {
    let context = state.templates.page_context(&ctx);
    state.templates.render("about.html", &context)
}

// =============================================================================
// Login / logout
// =============================================================================

/// GET /login
pub async fn login_page(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Html<String>> {
    let (error, saved_username, saved_remember) = match ctx.session_id {
        Some(id) => {
            let error = state.sessions.take_login_error(&id)?;
            let data = state.sessions.get(&id)?.unwrap_or_default();
            (
                error,
                data.remembered_identifier.unwrap_or_default(),
                data.remember_me_checked,
            )
        }
        None => (None, String::new(), false),
    };

    let mut context = state.templates.page_context(&ctx);
    context.insert("error", &error);
    context.insert("saved_username", &saved_username);
    context.insert("saved_remember", &saved_remember);
    state.templates.render("login.html", &context)
}

/// POST /login
///
/// `username` may hold a username or an email address.
pub async fn login_submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let identifier = form.username.trim();
    let password = form.password.trim();
    let remember = form.remember();

    let user = if identifier.is_empty() || password.is_empty() {
        None
    } else {
        authenticate(&state, identifier, password).await?
    };

    let Some(user) = user else {
        tracing::warn!(identifier = %identifier, "Failed login attempt");
        let session_id = match ctx.session_id {
            Some(id) => id,
            None => state.sessions.create()?,
        };
        state
            .sessions
            .update(&session_id, |data| data.login_error = Some(LOGIN_FAILED.to_string()))?;
        let mut response = Redirect::to("/login").into_response();
        attach_cookie(response.headers_mut(), &session_id, false)?;
        return Ok(response);
    };

    // The pre-login session id never survives a login
    let session_id = match ctx.session_id {
        Some(id) => state.sessions.rotate(&id)?,
        None => state.sessions.create()?,
    };
    state.sessions.update(&session_id, |data| {
        data.log_in(
            user.id,
            &user.username,
            user.preferred_currency,
            identifier,
            remember,
        )
    })?;
    tracing::info!(user_id = %user.id, "User logged in");

    let mut response = Redirect::to("/nurseries").into_response();
    attach_cookie(response.headers_mut(), &session_id, remember)?;
    Ok(response)
}

async fn authenticate(state: &AppState, identifier: &str, password: &str) -> AppResult<Option<User>> {
    let Some(user) = state.users.find_by_identifier(identifier).await? else {
        return Ok(None);
    };
    let verified = state.hasher.verify(password, &user.password_hash)?;
    Ok(verified.then_some(user))
}

/// GET /logout
pub async fn logout(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Redirect> {
    if let Some(id) = ctx.session_id {
        let empty = state.sessions.update(&id, |data| {
            data.log_out();
            data.is_empty()
        })?;
        if empty {
            state.sessions.remove(&id)?;
        }
        if let Some(user_id) = ctx.identity.user_id() {
            tracing::info!(user_id = %user_id, "User logged out");
        }
    }
    Ok(Redirect::to("/login"))
}

// =============================================================================
// Sign up / forgot password
// =============================================================================

/// GET /signup
pub async fn signup_page(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Html<String>> {
    render_signup(&state, &ctx, None, false)
}

/// POST /signup
pub async fn signup_submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<SignupForm>,
) -> AppResult<Html<String>> {
    let form = form.trimmed();
    match register(&state, &form).await? {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Account created");
            render_signup(&state, &ctx, None, true)
        }
        Err(message) => render_signup(&state, &ctx, Some(message), false),
    }
}

/// Create an account, or explain why the form was rejected
async fn register(state: &AppState, form: &SignupForm) -> AppResult<Result<User, String>> {
    if let Err(errors) = form.validate() {
        return Ok(Err(first_message(&errors)));
    }

    let min = state.config.accounts.min_password_length;
    if form.password.chars().count() < min {
        return Ok(Err(format!("Password must be at least {} characters.", min)));
    }

    let user = User::new(&form.username, &form.email, state.hasher.hash(&form.password)?);
    match state.users.create(user).await {
        Ok(user) => Ok(Ok(user)),
        Err(err) if is_conflict(&err) => Ok(Err(ACCOUNT_EXISTS.to_string())),
        Err(err) => Err(err.into()),
    }
}

/// Whether a store error reports a taken username or email
fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<EntityError>(),
        Some(EntityError::AlreadyExists { .. })
    )
}

fn render_signup(
    state: &AppState,
    ctx: &RequestContext,
    error: Option<String>,
    success: bool,
) -> AppResult<Html<String>> {
    let mut context = state.templates.page_context(ctx);
    context.insert("error", &error);
    context.insert("success", &success);
    state.templates.render("signup.html", &context)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// GET /forgot-password
pub async fn forgot_password_page(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<Html<String>> {
    let mut context = state.templates.page_context(&ctx);
    context.insert("message", &None::<String>);
    state.templates.render("forgot_password.html", &context)
}

/// POST /forgot-password
///
/// The answer does not reveal whether the address is registered.
pub async fn forgot_password_submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<ForgotPasswordForm>,
) -> AppResult<Html<String>> {
    let message = (!form.email.trim().is_empty()).then_some(RESET_SENT);
    let mut context = state.templates.page_context(&ctx);
    context.insert("message", &message);
    state.templates.render("forgot_password.html", &context)
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Serialize)]
struct SortOption {
    key: &'static str,
    label: String,
}

/// GET /nurseries?q=&curriculum=&sort=
pub async fn nurseries_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<CatalogParams>,
) -> AppResult<Response> {
    if require_user(&ctx).is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let descriptor = params.to_query();
    let dataset = state.facilities.list().await?;
    let result = catalog::query(&dataset, &descriptor);
    let cards: Vec<FacilityCard> = result
        .into_iter()
        .map(|f| FacilityCard::new(f, &state.rates, ctx.currency))
        .collect();

    let sort_options: Vec<SortOption> = SortKey::ALL
        .iter()
        .map(|key| SortOption {
            key: key.as_str(),
            label: sort_label(ctx.language, key.as_str()),
        })
        .collect();

    let mut context = state.templates.page_context(&ctx);
    context.insert("nurseries", &cards);
    context.insert("curricula", &catalog::curricula(&dataset));
    context.insert("search_query", params.q.as_deref().unwrap_or_default().trim());
    context.insert(
        "curriculum_filter",
        params.curriculum.as_deref().unwrap_or_default().trim(),
    );
    context.insert("sort_by", descriptor.sort().as_str());
    context.insert("sort_options", &sort_options);
    Ok(state.templates.render("nurseries.html", &context)?.into_response())
}

/// GET /nursery/{id}
pub async fn nursery_detail(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> AppResult<Response> {
    if require_user(&ctx).is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let facility = match parse_id("nursery", &id) {
        Ok(id) => state.facilities.get(&id).await?,
        Err(_) => None,
    };
    let Some(facility) = facility else {
        let page = state.templates.not_found(&ctx, "Nursery not found.")?;
        return Ok((StatusCode::NOT_FOUND, page).into_response());
    };

    let reviews: Vec<_> = state
        .reviews
        .list_for_nursery(&facility.id)
        .await?
        .iter()
        .map(Review::summary)
        .collect();

    let mut context = state.templates.page_context(&ctx);
    context.insert("nursery", &FacilityCard::new(&facility, &state.rates, ctx.currency));
    context.insert("reviews", &reviews);
    Ok(state.templates.render("nursery_detail.html", &context)?.into_response())
}

// =============================================================================
// Profile
// =============================================================================

/// GET /profile
pub async fn profile_page(State(state): State<AppState>, ctx: RequestContext) -> AppResult<Response> {
    let Some(user) = current_user(&state, &ctx).await? else {
        return Ok(Redirect::to("/login").into_response());
    };
    Ok(render_profile(&state, &ctx, &user, None, false)?.into_response())
}

/// POST /profile
pub async fn profile_submit(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let Some(user) = current_user(&state, &ctx).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    if let Err(errors) = form.validate() {
        let page = render_profile(&state, &ctx, &user, Some(first_message(&errors)), false)?;
        return Ok(page.into_response());
    }

    let mut edited = user.clone();
    edited.apply_profile(&form);
    let user = match state.users.update(edited).await {
        Ok(user) => user,
        Err(err) if is_conflict(&err) => {
            let message = Some(PROFILE_TAKEN.to_string());
            let page = render_profile(&state, &ctx, &user, message, false)?;
            return Ok(page.into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let currency = form.currency();
    let mut ctx = ctx;
    if let Some(session_id) = ctx.session_id {
        state.sessions.update(&session_id, |data| {
            data.user_name = Some(user.username.clone());
            if let Some(currency) = currency {
                data.currency = Some(currency);
            }
        })?;
    }
    if let Some(currency) = currency {
        ctx.currency = currency;
    }
    ctx.identity = Identity::User {
        user_id: user.id,
        username: user.username.clone(),
    };

    tracing::info!(user_id = %user.id, "Profile updated");
    Ok(render_profile(&state, &ctx, &user, None, true)?.into_response())
}

/// The logged-in user, `None` when anonymous or the account is gone
async fn current_user(state: &AppState, ctx: &RequestContext) -> AppResult<Option<User>> {
    let Some((user_id, _)) = require_user(ctx) else {
        return Ok(None);
    };
    let user = state.users.get(&user_id).await?;
    if user.is_none() {
        if let Some(session_id) = ctx.session_id {
            state.sessions.update(&session_id, |data| data.log_out())?;
        }
    }
    Ok(user)
}

fn render_profile(
    state: &AppState,
    ctx: &RequestContext,
    user: &User,
    error: Option<String>,
    success: bool,
) -> AppResult<Html<String>> {
    let currencies: Vec<&str> = Currency::ALL.iter().map(Currency::code).collect();
    let mut context = state.templates.page_context(ctx);
    context.insert("user", &ProfileView::from(user));
    context.insert("currencies", &currencies);
    context.insert("error", &error);
    context.insert("success", &success);
    state.templates.render("profile.html", &context)
}
