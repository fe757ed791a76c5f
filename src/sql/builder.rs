//! Builds parameterized WHERE filters, paged SELECTs and partial UPDATEs.

use super::params::PgBindValue;
use sqlx::postgres::{PgArguments, PgRow, Postgres};
use sqlx::query::QueryAs;

/// SQL text plus its positional parameters ($1, $2, ...).
#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    pub fn query_as<O>(&self) -> QueryAs<'_, Postgres, O, PgArguments>
    where
        O: for<'r> sqlx::FromRow<'r, PgRow>,
    {
        tracing::debug!(sql = %self.sql, params = ?self.params, "query");
        let mut q = sqlx::query_as::<_, O>(&self.sql);
        for p in &self.params {
            q = q.bind(p.clone());
        }
        q
    }
}

fn placeholder(n: usize) -> String {
    format!("${}", n)
}

/// AND-joined WHERE conditions. Each condition receives the placeholder of its own parameter,
/// which it may reference more than once.
#[derive(Debug, Default)]
pub struct Filters {
    clauses: Vec<String>,
    params: Vec<PgBindValue>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, value: impl Into<PgBindValue>, clause: F)
    where
        F: FnOnce(&str) -> String,
    {
        self.params.push(value.into());
        let ph = placeholder(self.params.len());
        self.clauses.push(clause(&ph));
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// `{head} WHERE ...`, e.g. a COUNT(*) over the same filters.
    pub fn select(&self, head: &str) -> QueryBuf {
        QueryBuf {
            sql: format!("{} {}", head, self.where_sql()).trim_end().to_string(),
            params: self.params.clone(),
        }
    }

    /// `{head} WHERE ... ORDER BY {order_by} LIMIT $n OFFSET $n+1`.
    pub fn select_page(&self, head: &str, order_by: &str, limit: i64, offset: i64) -> QueryBuf {
        let mut params = self.params.clone();
        params.push(PgBindValue::I64(limit));
        let limit_ph = placeholder(params.len());
        params.push(PgBindValue::I64(offset));
        let offset_ph = placeholder(params.len());
        let where_sql = self.where_sql();
        let mut sql = head.to_string();
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        sql.push_str(&format!(" ORDER BY {} LIMIT {} OFFSET {}", order_by, limit_ph, offset_ph));
        QueryBuf { sql, params }
    }
}

/// Column assignments for a partial UPDATE keyed by `id`.
#[derive(Debug, Default)]
pub struct Assignments {
    sets: Vec<String>,
    params: Vec<PgBindValue>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: impl Into<PgBindValue>) {
        self.params.push(value.into());
        self.sets.push(format!("{} = {}", column, placeholder(self.params.len())));
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// `UPDATE {table} SET ..., updated_at = NOW() WHERE id = $n RETURNING {returning}`.
    pub fn update_by_id(&self, table: &str, id: i64, returning: &str) -> QueryBuf {
        let mut params = self.params.clone();
        params.push(PgBindValue::I64(id));
        let sql = format!(
            "UPDATE {} SET {}, updated_at = NOW() WHERE id = {} RETURNING {}",
            table,
            self.sets.join(", "),
            placeholder(params.len()),
            returning
        );
        QueryBuf { sql, params }
    }
}

/// `%term%` for ILIKE matching, with LIKE wildcards in the term escaped.
pub fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
