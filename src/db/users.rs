use crate::models::{Company, User};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, phone, tax_id, created_at, updated_at
        FROM users
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, name, phone, tax_id, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_company(pool: &PgPool, company_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        r#"
        SELECT id, owner_id, name, email, phone, address, tax_id, created_at, updated_at
        FROM companies
        WHERE id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(pool)
    .await
}

/// Companies owned by a user
pub async fn list_user_companies(pool: &PgPool, user_id: Uuid) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        r#"
        SELECT id, owner_id, name, email, phone, address, tax_id, created_at, updated_at
        FROM companies
        WHERE owner_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
