use axum::Json;
use serde::Deserialize;

use super::{ok, ApiResponse};
use crate::service::invoices::{preview_totals as compute_preview, TotalsPreview};
use crate::service::totals::InvoiceLineItem;

/// Request body: unsaved line items from the invoice form
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub items: Vec<InvoiceLineItem>,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Totals for the form summary; never fails, bad numbers count as zero.
pub async fn preview_totals(Json(req): Json<PreviewRequest>) -> Json<ApiResponse<TotalsPreview>> {
    ok(compute_preview(&req.items))
}
