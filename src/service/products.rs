//! Product catalog queries.

use super::paging::PageRequest;
use super::validation::optional_text;
use crate::error::AppError;
use crate::model::Product;
use crate::response::Paged;
use crate::sql::{contains_pattern, Assignments, Filters};
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::PgPool;

const PRODUCT_COLUMNS: &str = "id, code, name, description, content, dosage, image, created_at, updated_at";
const DUPLICATE_CODE: &str = "product code already exists";

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub code: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

/// Partial update. `code` and `name` apply only when non-empty; the nullable text columns
/// apply whenever present, and null clears them.
#[derive(Debug, Default, PartialEq)]
pub struct ProductChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    pub nullable: Vec<(&'static str, Option<String>)>,
}

impl ProductChanges {
    pub fn from_body(body: &Map<String, Value>) -> Result<Self, AppError> {
        let non_empty = |field: &str| -> Result<Option<String>, AppError> {
            Ok(optional_text(body, field)?.flatten().filter(|s| !s.is_empty()))
        };
        let mut changes = ProductChanges {
            code: non_empty("code")?,
            name: non_empty("name")?,
            nullable: Vec::new(),
        };
        for column in ["description", "content", "dosage", "image"] {
            if let Some(v) = optional_text(body, column)? {
                changes.nullable.push((column, v));
            }
        }
        Ok(changes)
    }

    fn assignments(&self) -> Assignments {
        let mut a = Assignments::new();
        if let Some(code) = &self.code {
            a.set("code", code.as_str());
        }
        if let Some(name) = &self.name {
            a.set("name", name.as_str());
        }
        for (column, v) in &self.nullable {
            a.set(column, v.clone());
        }
        a
    }
}

pub struct ProductService;

impl ProductService {
    pub async fn create(pool: &PgPool, input: NewProduct) -> Result<Product, AppError> {
        if Self::find_by_code(pool, &input.code).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_CODE.into()));
        }
        let sql = format!(
            "INSERT INTO products (code, name, description, content, dosage, image) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PRODUCT_COLUMNS
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.content)
            .bind(&input.dosage)
            .bind(&input.image)
            .fetch_one(pool)
            .await
            .map_err(|e| AppError::from_constraint(e, DUPLICATE_CODE))
    }

    /// Filtered page ordered by newest id first.
    pub async fn list(pool: &PgPool, query: &ProductQuery, page: PageRequest) -> Result<Paged<Product>, AppError> {
        let mut filters = Filters::new();
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            filters.add(contains_pattern(search), |p| {
                format!("(name ILIKE {p} OR description ILIKE {p} OR code ILIKE {p})")
            });
        }
        if let Some(code) = query.code.as_deref().filter(|s| !s.is_empty()) {
            filters.add(code, |p| format!("code = {}", p));
        }
        let items = filters
            .select_page(
                &format!("SELECT {} FROM products", PRODUCT_COLUMNS),
                "id DESC",
                page.size,
                page.offset(),
            )
            .query_as::<Product>()
            .fetch_all(pool)
            .await?;
        let (total,) = filters
            .select("SELECT COUNT(*) FROM products")
            .query_as::<(i64,)>()
            .fetch_one(pool)
            .await?;
        Ok(Paged {
            items,
            total,
            page: page.page,
            size: page.size,
        })
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Product, AppError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("product not found".into()))
    }

    pub async fn get_by_code(pool: &PgPool, code: &str) -> Result<Product, AppError> {
        Self::find_by_code(pool, code)
            .await?
            .ok_or_else(|| AppError::NotFound("product not found".into()))
    }

    pub async fn update(pool: &PgPool, id: i64, changes: ProductChanges) -> Result<Product, AppError> {
        let current = Self::get(pool, id).await?;
        if let Some(code) = changes.code.as_deref().filter(|c| *c != current.code) {
            if Self::find_by_code(pool, code).await?.is_some() {
                return Err(AppError::Conflict(DUPLICATE_CODE.into()));
            }
        }
        let assignments = changes.assignments();
        if assignments.is_empty() {
            return Ok(current);
        }
        assignments
            .update_by_id("products", id, PRODUCT_COLUMNS)
            .query_as::<Product>()
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::from_constraint(e, DUPLICATE_CODE))?
            .ok_or_else(|| AppError::NotFound("product not found".into()))
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "product is in use"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("product not found".into()));
        }
        Ok(())
    }

    async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {} FROM products WHERE code = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }
}
