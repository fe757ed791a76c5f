//! Row types for the catalog, users and quotations, plus the list shapes returned by the API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub dosage: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user row. The password hash is read for login but never serialized.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Quotation {
    pub id: i64,
    pub client_first_name: String,
    pub client_last_name: String,
    pub business_name: String,
    pub department: String,
    pub municipality: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
}

/// Quotation as shown in listings: display client and creation date.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct QuotationSummary {
    pub id: i64,
    pub client: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct QuotationDetail {
    pub id: i64,
    pub quotation_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line of a quotation joined with its product.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct QuotationLine {
    pub product: String,
    pub code: String,
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuotationStatus {
    Pending,
    Sent,
    Completed,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Pending => "pending",
            QuotationStatus::Sent => "sent",
            QuotationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(QuotationStatus::Pending),
            "sent" => Ok(QuotationStatus::Sent),
            "completed" => Ok(QuotationStatus::Completed),
            _ => Err(()),
        }
    }
}

/// Display id used by the dashboard, e.g. `COT-007`.
pub fn format_quotation_id(id: i64) -> String {
    format!("COT-{:03}", id)
}

#[derive(Clone, Debug, Serialize)]
pub struct QuotationListItem {
    pub id: i64,
    pub id_fmt: String,
    pub client: String,
    pub date: DateTime<Utc>,
    pub status: String,
}

impl From<QuotationSummary> for QuotationListItem {
    fn from(s: QuotationSummary) -> Self {
        QuotationListItem {
            id: s.id,
            id_fmt: format_quotation_id(s.id),
            client: s.client,
            date: s.created_at,
            status: s.status,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RecentQuotation {
    pub id: String,
    pub client: String,
    pub date: NaiveDate,
    pub status: String,
}

impl From<QuotationSummary> for RecentQuotation {
    fn from(s: QuotationSummary) -> Self {
        RecentQuotation {
            id: format_quotation_id(s.id),
            client: s.client,
            date: s.created_at.date_naive(),
            status: s.status,
        }
    }
}
