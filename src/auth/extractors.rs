use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};

use crate::{auth::repo::User, error::AppError, state::AppState};

/// The user behind the request's bearer token. Any failure on the way is a
/// plain 401.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            debug!("missing or malformed Authorization header");
            AppError::Unauthorized
        })?;

        let claims = state.jwt.verify(token)?;

        match state.users.find_by_email(&claims.sub).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!(subject = %claims.sub, "token subject has no user");
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
