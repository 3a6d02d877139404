use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

use crate::auth::{Claims, AUTH_COOKIE};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::models::{LoginRequest, MessageResponse, RegisterRequest, UpdateProfileRequest, UserPublic};
use crate::services::Session;
use crate::AppState;

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.auth.secure_cookie())
        .same_site(SameSite::Strict)
        .build()
}

/// Register a new user and start a session
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<UserPublic>)> {
    let Session { user, token } = state.users.register(req).await?;
    let jar = jar.add(session_cookie(&state, token));

    Ok((StatusCode::CREATED, jar, Json(user)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<UserPublic>)> {
    let Session { user, token } = state.users.login(req).await?;
    let jar = jar.add(session_cookie(&state, token));

    Ok((jar, Json(user)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<UserPublic>>> {
    Ok(Json(state.users.list_users().await?))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<UserPublic>> {
    let user = state.users.get_profile(claims.user_id()?).await?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserPublic>> {
    let user = state.users.update_profile(claims.user_id()?, req).await?;
    Ok(Json(user))
}
