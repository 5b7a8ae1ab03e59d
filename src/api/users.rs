use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{ok, ApiResponse, AppState};
use crate::error::AppResult;
use crate::models::{Company, User};

pub async fn list(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    Ok(ok(state.users.list().await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(ok(state.users.get(user_id).await?))
}

pub async fn companies(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Company>>>> {
    Ok(ok(state.users.companies(user_id).await?))
}
