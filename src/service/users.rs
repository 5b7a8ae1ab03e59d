use sqlx::PgPool;
use uuid::Uuid;

use crate::db::users as queries;
use crate::error::{AppError, AppResult};
use crate::models::{Company, User};

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        Ok(queries::list_users(&self.pool).await?)
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<User> {
        queries::get_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))
    }

    /// Companies owned by the user; unknown users are a 404, not an empty list.
    pub async fn companies(&self, user_id: Uuid) -> AppResult<Vec<Company>> {
        self.get(user_id).await?;
        Ok(queries::list_user_companies(&self.pool, user_id).await?)
    }
}
