//! Product catalog handlers.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::model::Product;
use crate::response::{created, Paged};
use crate::service::{body_object, PageRequest, ProductChanges, ProductQuery, ProductService, RequestValidator};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 100;

pub async fn create_product(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_object(body)?;
    RequestValidator::require(&body, &["code", "name"], "code and name are required")?;
    let product = ProductService::create(&state.pool, RequestValidator::parse(body)?).await?;
    Ok(created(product))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Paged<Product>>, AppError> {
    let page = PageRequest::parse(query.page.as_deref(), query.size.as_deref(), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    Ok(Json(ProductService::list(&state.pool, &query, page).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(ProductService::get(&state.pool, parse_id(&id)?).await?))
}

pub async fn get_product_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(ProductService::get_by_code(&state.pool, &code).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id)?;
    let changes = ProductChanges::from_body(&body_object(body)?)?;
    Ok(Json(ProductService::update(&state.pool, id, changes).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ProductService::delete(&state.pool, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
