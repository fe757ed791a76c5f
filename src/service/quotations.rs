//! Quotation headers: creation, listings for the dashboard, line lookup and status changes.

use super::paging::PageRequest;
use crate::error::AppError;
use crate::model::{
    format_quotation_id, Quotation, QuotationLine, QuotationListItem, QuotationStatus, QuotationSummary,
    RecentQuotation,
};
use crate::response::QuotationPage;
use crate::sql::{contains_pattern, Filters};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

const QUOTATION_COLUMNS: &str = "id, client_first_name, client_last_name, business_name, department, \
     municipality, status, created_at, created_by";

/// Business name when set, otherwise the client's full name.
const CLIENT_EXPR: &str = "COALESCE(NULLIF(TRIM(c.business_name), ''), \
     TRIM(CONCAT_WS(' ', c.client_first_name, c.client_last_name)))";

#[derive(Debug, Deserialize)]
pub struct NewQuotation {
    pub client_first_name: String,
    pub client_last_name: String,
    pub business_name: String,
    pub department: String,
    pub municipality: String,
    /// Kept only when it is an integer.
    #[serde(default)]
    pub created_by: Value,
}

impl NewQuotation {
    fn creator(&self) -> Option<i64> {
        self.created_by.as_i64()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotationFilters {
    pub q: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl QuotationFilters {
    fn to_filters(&self) -> Result<Filters, AppError> {
        let mut filters = Filters::new();
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filters.add(contains_pattern(q), |p| format!("{} ILIKE {}", CLIENT_EXPR, p));
        }
        if let Some(raw) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let status: QuotationStatus = raw
                .parse()
                .map_err(|_| AppError::BadRequest(format!("unknown status: {}", raw)))?;
            filters.add(status.as_str(), |p| format!("c.status = {}", p));
        }
        if let Some(raw) = self.date.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest("date must be YYYY-MM-DD".into()))?;
            filters.add(date.to_string(), |p| format!("c.created_at::date = {}::date", p));
        }
        Ok(filters)
    }
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub id: i64,
    pub status: &'static str,
    pub id_fmt: String,
    pub ok: bool,
}

fn summary_select() -> String {
    format!(
        "SELECT c.id, {} AS client, c.created_at, c.status FROM quotations c",
        CLIENT_EXPR
    )
}

pub struct QuotationService;

impl QuotationService {
    pub async fn create(pool: &PgPool, input: NewQuotation) -> Result<Quotation, AppError> {
        let sql = format!(
            "INSERT INTO quotations \
             (client_first_name, client_last_name, business_name, department, municipality, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            QUOTATION_COLUMNS
        );
        sqlx::query_as::<_, Quotation>(&sql)
            .bind(input.client_first_name.trim())
            .bind(input.client_last_name.trim())
            .bind(input.business_name.trim())
            .bind(&input.department)
            .bind(input.municipality.trim())
            .bind(input.creator())
            .fetch_one(pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "quotation already exists"))
    }

    /// Filtered page, newest first.
    pub async fn list(
        pool: &PgPool,
        query: &QuotationFilters,
        page: PageRequest,
    ) -> Result<QuotationPage<QuotationListItem>, AppError> {
        let filters = query.to_filters()?;
        let (total,) = filters
            .select("SELECT COUNT(*) FROM quotations c")
            .query_as::<(i64,)>()
            .fetch_one(pool)
            .await?;
        let rows = filters
            .select_page(&summary_select(), "c.created_at DESC, c.id DESC", page.size, page.offset())
            .query_as::<QuotationSummary>()
            .fetch_all(pool)
            .await?;
        Ok(QuotationPage {
            total,
            page: page.page,
            page_size: page.size,
            data: rows.into_iter().map(QuotationListItem::from).collect(),
        })
    }

    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<RecentQuotation>, AppError> {
        let rows = Filters::new()
            .select_page(&summary_select(), "c.created_at DESC, c.id DESC", limit, 0)
            .query_as::<QuotationSummary>()
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(RecentQuotation::from).collect())
    }

    /// Lines of one quotation with product name and code, in insertion order.
    pub async fn lines(pool: &PgPool, quotation_id: i64) -> Result<Vec<QuotationLine>, AppError> {
        let rows = sqlx::query_as::<_, QuotationLine>(
            r#"
            SELECT p.name AS product, p.code AS code, d.quantity, d.notes
            FROM quotation_details d
            JOIN products p ON p.id = d.product_id
            WHERE d.quotation_id = $1
            ORDER BY d.id ASC
            "#,
        )
        .bind(quotation_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Move a quotation to `status`. Completing requires at least one line.
    pub async fn set_status(pool: &PgPool, id: i64, status: QuotationStatus) -> Result<StatusChange, AppError> {
        let mut tx = pool.begin().await?;
        let locked: Option<(i64,)> = sqlx::query_as("SELECT id FROM quotations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::NotFound("quotation not found".into()));
        }
        if status == QuotationStatus::Completed {
            let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quotation_details WHERE quotation_id = $1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
            if lines == 0 {
                return Err(AppError::Conflict(
                    "cannot complete a quotation without details".into(),
                ));
            }
        }
        sqlx::query("UPDATE quotations SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::info!(quotation_id = id, status = %status, "quotation status changed");
        Ok(StatusChange {
            id,
            status: status.as_str(),
            id_fmt: format_quotation_id(id),
            ok: true,
        })
    }
}
