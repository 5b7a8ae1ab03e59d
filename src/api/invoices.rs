use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{ok, ApiResponse, AppState};
use crate::error::AppResult;
use crate::models::{
    FilterOption, Invoice, InvoiceDetail, InvoiceDirection, InvoiceListItem, NewInvoice,
    NewPayment, Paginated, Payment, StatusUpdate,
};
use crate::service::document::InvoiceDocument;

type ListResponse = Json<ApiResponse<Paginated<InvoiceListItem>>>;

/// Optional `?direction=sent|received` for the export
#[derive(Debug, Default, Deserialize)]
pub struct DirectionQuery {
    pub direction: Option<InvoiceDirection>,
}

pub async fn list_all(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(filter): Query<FilterOption>,
) -> AppResult<ListResponse> {
    Ok(ok(state.invoices.list(company_id, None, &filter).await?))
}

pub async fn list_sent(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(filter): Query<FilterOption>,
) -> AppResult<ListResponse> {
    Ok(ok(state
        .invoices
        .list(company_id, Some(InvoiceDirection::Sent), &filter)
        .await?))
}

pub async fn list_received(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(filter): Query<FilterOption>,
) -> AppResult<ListResponse> {
    Ok(ok(state
        .invoices
        .list(company_id, Some(InvoiceDirection::Received), &filter)
        .await?))
}

pub async fn export(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(filter): Query<FilterOption>,
    Query(scope): Query<DirectionQuery>,
) -> AppResult<impl IntoResponse> {
    let csv = state
        .invoices
        .export_csv(company_id, scope.direction, &filter)
        .await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"invoices.csv\""),
        ],
        csv,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(new): Json<NewInvoice>,
) -> AppResult<(StatusCode, Json<ApiResponse<InvoiceDetail>>)> {
    let detail = state.invoices.create(company_id, new).await?;
    Ok((StatusCode::CREATED, ok(detail)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<InvoiceDetail>>> {
    Ok(ok(state.invoices.get(company_id, invoice_id).await?))
}

pub async fn view(
    State(state): State<AppState>,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<InvoiceDocument>>> {
    Ok(ok(state.invoices.document(company_id, invoice_id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
    Json(update): Json<StatusUpdate>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    Ok(ok(state
        .invoices
        .update_status(company_id, invoice_id, update.status)
        .await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
) -> AppResult<impl IntoResponse> {
    state.invoices.delete(company_id, invoice_id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Vec<Payment>>>> {
    Ok(ok(state.payments.list(company_id, invoice_id).await?))
}

pub async fn create_payment(
    State(state): State<AppState>,
    Path((company_id, invoice_id)): Path<(Uuid, Uuid)>,
    Json(new): Json<NewPayment>,
) -> AppResult<(StatusCode, Json<ApiResponse<Payment>>)> {
    let payment = state.payments.create(company_id, invoice_id, new).await?;
    Ok((StatusCode::CREATED, ok(payment)))
}
