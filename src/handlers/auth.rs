// Authentication handlers: register, login, logout, me
// Login hands the access token back in the body and in an HttpOnly cookie.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use serde_json::json;
use time::Duration;
use tracing::info;

use crate::{
    app::AppState,
    app_config::{AppConfig, ACCESS_TOKEN_COOKIE},
    middleware::AuthenticatedUser,
    models::{LoginRequest, RegisterRequest},
    utils::ApiError,
};

/// Cookie carrying the access token; lives exactly as long as the token
fn access_token_cookie(token: String, max_age_secs: u64, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.security.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs as i64))
        .build()
}

/// Expired twin of the access cookie; browsers drop it on receipt
fn cleared_access_token_cookie(config: &AppConfig) -> Cookie<'static> {
    let mut cookie = access_token_cookie(String::new(), 0, config);
    cookie.make_removal();
    cookie
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": user,
            "message": "Registration successful",
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.accounts.login(request).await?;

    let cookie = access_token_cookie(response.token.clone(), response.expires_in, &state.config);
    Ok((jar.add(cookie), Json(response)))
}

/// POST /api/auth/logout
///
/// Tokens are stateless, so logging out only clears the cookie. The expired
/// cookie is sent even when the request authenticated with a bearer header.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(cleared_access_token_cookie(&state.config));
    (jar, Json(json!({ "message": "Logged out successfully" })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.me(caller.user_id).await?;
    info!("Profile lookup for user {}", user.id);
    Ok(Json(json!({ "user": user })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_cookie_attributes() {
        let config = AppConfig::for_test();
        let cookie = access_token_cookie("abc".to_string(), 3600, &config);

        assert_eq!(cookie.name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn test_cleared_cookie_expires_immediately() {
        let config = AppConfig::for_test();
        let cookie = cleared_access_token_cookie(&config);

        assert_eq!(cookie.name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_access_cookie_secure_when_configured() {
        let mut config = AppConfig::for_test();
        config.security.secure_cookies = true;
        let cookie = access_token_cookie("abc".to_string(), 60, &config);
        assert_eq!(cookie.secure(), Some(true));
    }
}
