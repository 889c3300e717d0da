use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{normalize_email, PublicUser, RegisterRequest, TokenForm, TokenResponse},
        extractors::CurrentUser,
        password::{hash_password, verify_password, verify_password_for_unknown_user},
    },
    error::AppError,
    extract::{ApiForm, ApiJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(login_for_access_token))
        .route("/register", post(register))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, form))]
pub async fn login_for_access_token(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<TokenForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let email = normalize_email(&form.username);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        verify_password_for_unknown_user(&form.password);
        return Err(AppError::BadCredentials);
    };

    if !verify_password(&form.password, &user.password_hash) {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::BadCredentials);
    }

    let access_token = state.jwt.sign(&user.email)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let payload = payload.validate()?;

    // Early exit only; the store still reports a duplicate if we lose a race.
    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::EmailTaken);
    }

    let hash = hash_password(&payload.password)?;
    let user = state.users.create(&payload.email, &hash).await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(user.into()))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}
