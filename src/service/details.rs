//! Quotation line items.

use crate::error::AppError;
use crate::model::QuotationDetail;
use serde::Deserialize;
use sqlx::PgPool;

const DETAIL_COLUMNS: &str = "id, quotation_id, product_id, quantity, notes, created_at";

#[derive(Debug, Deserialize)]
pub struct NewDetail {
    pub quotation_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewDetail {
    pub fn check(&self) -> Result<(), AppError> {
        if self.quantity <= 0 {
            return Err(AppError::BadRequest("quantity must be greater than zero".into()));
        }
        Ok(())
    }
}

pub struct QuotationDetailService;

impl QuotationDetailService {
    /// Insert one line. Unknown quotation or product ids surface as a 400.
    pub async fn create(pool: &PgPool, input: NewDetail) -> Result<QuotationDetail, AppError> {
        input.check()?;
        let sql = format!(
            "INSERT INTO quotation_details (quotation_id, product_id, quantity, notes) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            DETAIL_COLUMNS
        );
        sqlx::query_as::<_, QuotationDetail>(&sql)
            .bind(input.quotation_id)
            .bind(input.product_id)
            .bind(input.quantity)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "detail already exists"))
    }

    pub async fn list_for(pool: &PgPool, quotation_id: i64) -> Result<Vec<QuotationDetail>, AppError> {
        let sql = format!(
            "SELECT {} FROM quotation_details WHERE quotation_id = $1 ORDER BY id",
            DETAIL_COLUMNS
        );
        let rows = sqlx::query_as::<_, QuotationDetail>(&sql)
            .bind(quotation_id)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }
}
