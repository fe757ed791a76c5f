//! User accounts and login.

use super::paging::PageRequest;
use crate::auth::{hash_password, issue_token, verify_password};
use crate::error::AppError;
use crate::model::User;
use crate::response::Paged;
use crate::settings::AuthSettings;
use crate::sql::{contains_pattern, Assignments, Filters};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, name, email, password_hash, role_id, created_at, updated_at";
const DUPLICATE_EMAIL: &str = "email is already registered";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
    pub role_id: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

/// Partial update; empty strings and zero ids are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<i64>,
    pub password: Option<String>,
}

impl UserChanges {
    fn normalized(self) -> Self {
        let text = |s: Option<String>| s.filter(|v| !v.is_empty());
        UserChanges {
            name: text(self.name),
            email: text(self.email),
            role_id: self.role_id.filter(|r| *r != 0),
            password: text(self.password),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub struct UserService;

impl UserService {
    pub async fn create(pool: &PgPool, input: NewUser) -> Result<User, AppError> {
        if Self::find_by_email(pool, &input.email).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
        }
        let hash = hash_password(input.password).await?;
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&hash)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
            .map_err(|e| AppError::from_constraint(e, DUPLICATE_EMAIL))
    }

    pub async fn list(pool: &PgPool, query: &UserQuery, page: PageRequest) -> Result<Paged<User>, AppError> {
        let mut filters = Filters::new();
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            filters.add(contains_pattern(search), |p| format!("(name ILIKE {p} OR email ILIKE {p})"));
        }
        if let Some(raw) = query.role_id.as_deref().filter(|s| !s.is_empty()) {
            let role_id: i64 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::BadRequest("role_id must be an integer".into()))?;
            filters.add(role_id, |p| format!("role_id = {}", p));
        }
        let items = filters
            .select_page(
                &format!("SELECT {} FROM users", USER_COLUMNS),
                "id DESC",
                page.size,
                page.offset(),
            )
            .query_as::<User>()
            .fetch_all(pool)
            .await?;
        let (total,) = filters
            .select("SELECT COUNT(*) FROM users")
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

    pub async fn get(pool: &PgPool, id: i64) -> Result<User, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub async fn update(pool: &PgPool, id: i64, changes: UserChanges) -> Result<User, AppError> {
        let changes = changes.normalized();
        let current = Self::get(pool, id).await?;
        if let Some(email) = changes.email.as_deref().filter(|e| *e != current.email) {
            if Self::find_by_email(pool, email).await?.is_some() {
                return Err(AppError::Conflict(DUPLICATE_EMAIL.into()));
            }
        }
        let mut a = Assignments::new();
        if let Some(name) = changes.name {
            a.set("name", name);
        }
        if let Some(email) = changes.email {
            a.set("email", email);
        }
        if let Some(role_id) = changes.role_id {
            a.set("role_id", role_id);
        }
        if let Some(password) = changes.password {
            a.set("password_hash", hash_password(password).await?);
        }
        if a.is_empty() {
            return Ok(current);
        }
        a.update_by_id("users", id, USER_COLUMNS)
            .query_as::<User>()
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::from_constraint(e, DUPLICATE_EMAIL))?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("user not found".into()));
        }
        Ok(())
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    /// Check credentials and issue a bearer token. Unknown email and wrong password are indistinguishable.
    pub async fn login(
        pool: &PgPool,
        auth: &AuthSettings,
        email: &str,
        password: String,
    ) -> Result<LoginResponse, AppError> {
        let user = Self::find_by_email(pool, email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;
        if !verify_password(password, user.password_hash.clone()).await? {
            tracing::info!(user_id = user.id, "login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        let token = issue_token(auth, user.id, user.role_id)?;
        Ok(LoginResponse { token, user })
    }

    async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_changes_are_dropped() {
        let c = UserChanges {
            name: Some(String::new()),
            email: Some("nuevo@test.com".into()),
            role_id: Some(0),
            password: None,
        }
        .normalized();
        assert!(c.name.is_none());
        assert_eq!(c.email.as_deref(), Some("nuevo@test.com"));
        assert!(c.role_id.is_none());
    }
}
