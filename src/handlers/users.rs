//! User account and login handlers.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::model::User;
use crate::response::{created, Paged};
use crate::service::{
    body_object, LoginResponse, PageRequest, RequestValidator, UserChanges, UserQuery, UserService,
};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Serialize)]
pub struct EmailExists {
    pub exists: bool,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_object(body)?;
    RequestValidator::require(
        &body,
        &["name", "email", "password", "role_id"],
        "name, email, password and role_id are required",
    )?;
    let user = UserService::create(&state.pool, RequestValidator::parse(body)?).await?;
    Ok(created(user))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Paged<User>>, AppError> {
    let page = PageRequest::parse(query.page.as_deref(), query.size.as_deref(), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    Ok(Json(UserService::list(&state.pool, &query, page).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(UserService::get(&state.pool, parse_id(&id)?).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id)?;
    let changes: UserChanges = RequestValidator::parse(body_object(body)?)?;
    Ok(Json(UserService::update(&state.pool, id, changes).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    UserService::delete(&state.pool, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/check-email?email=
pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<EmailExists>, AppError> {
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("email is required".into()))?;
    let exists = UserService::email_exists(&state.pool, &email).await?;
    Ok(Json(EmailExists { exists }))
}

/// POST /users/login: returns a bearer token and the user.
pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<LoginResponse>, AppError> {
    let body = body_object(body)?;
    RequestValidator::require(&body, &["email", "password"], "email and password are required")?;
    let req: LoginRequest = RequestValidator::parse(body)?;
    let res = UserService::login(&state.pool, &state.auth, &req.email, req.password).await?;
    Ok(Json(res))
}
