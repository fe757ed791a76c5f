//! Quotation and quotation line handlers.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::AppJson;
use crate::model::{QuotationDetail, QuotationLine, QuotationListItem, QuotationStatus, RecentQuotation};
use crate::response::{created_with_message, QuotationPage};
use crate::service::{
    body_object, parse_limit, NewDetail, PageRequest, QuotationDetailService, QuotationFilters,
    QuotationService, RequestValidator, StatusChange,
};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;
const DEFAULT_RECENT: i64 = 4;
const MAX_RECENT: i64 = 50;

#[derive(Deserialize)]
pub struct RecentQuery {
    pub limit: Option<String>,
}

#[derive(Deserialize)]
pub struct DetailQuery {
    pub quotation_id: Option<String>,
}

pub async fn create_quotation(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_object(body)?;
    RequestValidator::require(
        &body,
        &["client_first_name", "client_last_name", "business_name", "department", "municipality"],
        "missing required fields",
    )?;
    let quotation = QuotationService::create(&state.pool, RequestValidator::parse(body)?).await?;
    Ok(created_with_message("quotation created", quotation))
}

/// GET /quotations?page=&pageSize=&q=&status=&date=
pub async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<QuotationFilters>,
) -> Result<Json<QuotationPage<QuotationListItem>>, AppError> {
    let page = PageRequest::parse(
        query.page.as_deref(),
        query.page_size.as_deref(),
        DEFAULT_PAGE_SIZE,
        MAX_PAGE_SIZE,
    );
    Ok(Json(QuotationService::list(&state.pool, &query, page).await?))
}

/// GET /quotations/recent?limit=
pub async fn recent_quotations(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<RecentQuotation>>, AppError> {
    let limit = parse_limit(query.limit.as_deref(), DEFAULT_RECENT, MAX_RECENT);
    Ok(Json(QuotationService::recent(&state.pool, limit).await?))
}

/// GET /quotations/:id/details
pub async fn quotation_lines(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<QuotationLine>>, AppError> {
    Ok(Json(QuotationService::lines(&state.pool, parse_id(&id)?).await?))
}

/// PUT /quotations/:id/status: body `{status}`.
pub async fn update_quotation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Value>,
) -> Result<Json<StatusChange>, AppError> {
    let id = parse_id(&id)?;
    let status: QuotationStatus = body
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("")
        .parse()
        .map_err(|_| AppError::BadRequest("status not allowed".into()))?;
    Ok(Json(QuotationService::set_status(&state.pool, id, status).await?))
}

pub async fn create_detail(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    let body = body_object(body)?;
    RequestValidator::require(
        &body,
        &["quotation_id", "product_id", "quantity"],
        "required fields: quotation_id, product_id, quantity > 0",
    )?;
    let input: NewDetail = RequestValidator::parse(body)?;
    let detail = QuotationDetailService::create(&state.pool, input).await?;
    Ok(created_with_message("detail saved", detail))
}

/// GET /quotation-details?quotation_id=: empty list when no id is given.
pub async fn list_details(
    State(state): State<AppState>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<Vec<QuotationDetail>>, AppError> {
    let Some(raw) = query.quotation_id.filter(|s| !s.is_empty()) else {
        return Ok(Json(Vec::new()));
    };
    let rows = QuotationDetailService::list_for(&state.pool, parse_id(&raw)?).await?;
    Ok(Json(rows))
}
