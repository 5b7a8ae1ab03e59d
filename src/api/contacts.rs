use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{ok, ApiResponse, AppState};
use crate::error::AppResult;
use crate::models::{Contact, ContactType, FilterOption, NewContact, Paginated};

type ListResponse = Json<ApiResponse<Paginated<Contact>>>;

pub async fn list_all(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(filter): Query<FilterOption>,
) -> AppResult<ListResponse> {
    Ok(ok(state.contacts.list(company_id, None, &filter).await?))
}

pub async fn list_vendors(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(filter): Query<FilterOption>,
) -> AppResult<ListResponse> {
    Ok(ok(state
        .contacts
        .list(company_id, Some(ContactType::Vendor), &filter)
        .await?))
}

pub async fn list_clients(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(filter): Query<FilterOption>,
) -> AppResult<ListResponse> {
    Ok(ok(state
        .contacts
        .list(company_id, Some(ContactType::Client), &filter)
        .await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path((company_id, contact_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Contact>>> {
    Ok(ok(state.contacts.get(company_id, contact_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(new): Json<NewContact>,
) -> AppResult<(StatusCode, Json<ApiResponse<Contact>>)> {
    let contact = state.contacts.create(company_id, new).await?;
    Ok((StatusCode::CREATED, ok(contact)))
}
