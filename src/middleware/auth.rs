// Request authentication: the access token comes from the `access-token` cookie
// or an `Authorization: Bearer` header, cookie first.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    app::AppState,
    app_config::ACCESS_TOKEN_COOKIE,
    models::{AccessTokenClaims, Role},
    utils::ApiError,
};

/// Caller identity decoded from a verified access token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub token_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: u64,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and instructors may author products and posts
    pub fn can_author(&self) -> bool {
        self.role.can_author()
    }

    /// Owner or admin
    pub fn can_manage(&self, owner: Uuid) -> bool {
        self.is_admin() || self.user_id == owner
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }

    pub fn require_author(&self) -> Result<(), ApiError> {
        if self.can_author() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Admin or instructor access required".to_string(),
            ))
        }
    }
}

impl TryFrom<AccessTokenClaims> for AuthenticatedUser {
    type Error = ApiError;

    fn try_from(claims: AccessTokenClaims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::InvalidToken)?;
        let role = Role::from_string(&claims.role).map_err(|_| ApiError::InvalidToken)?;

        Ok(Self {
            user_id,
            token_id: claims.jti,
            email: claims.email,
            name: claims.name,
            role,
            exp: claims.exp,
        })
    }
}

/// Anonymous when no token is sent or the token fails verification
#[derive(Debug, Clone, Default)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl OptionalUser {
    pub fn as_ref(&self) -> Option<&AuthenticatedUser> {
        self.0.as_ref()
    }
}

/// Token from the cookie, falling back to the bearer header
pub fn extract_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn verify(token: &str, state: &AppState) -> Result<AuthenticatedUser, ApiError> {
    let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
        warn!("JWT validation failed: {}", e);
        ApiError::InvalidToken
    })?;
    AuthenticatedUser::try_from(claims)
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let token = extract_token(parts).ok_or_else(ApiError::unauthenticated)?;
        let user = verify(&token, state)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_token(parts) else {
            return Ok(OptionalUser(None));
        };

        match verify(&token, state) {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(_) => {
                debug!("Ignoring invalid token on optional-auth route");
                Ok(OptionalUser(None))
            },
        }
    }
}
