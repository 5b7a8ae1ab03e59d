pub mod contacts;
pub mod handlers;
pub mod invoices;
pub mod users;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::service::{ContactService, InvoiceService, PaymentService, UserService};

/// Shared state: one instance of each service
#[derive(Clone)]
pub struct AppState {
    pub invoices: Arc<InvoiceService>,
    pub contacts: Arc<ContactService>,
    pub payments: Arc<PaymentService>,
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &AppConfig) -> Self {
        Self {
            invoices: Arc::new(InvoiceService::new(
                pool.clone(),
                config.invoices.number_prefix.clone(),
            )),
            contacts: Arc::new(ContactService::new(pool.clone())),
            payments: Arc::new(PaymentService::new(pool.clone())),
            users: Arc::new(UserService::new(pool)),
        }
    }
}

/// Success envelope: `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

pub fn router(state: AppState) -> Router {
    let company_routes = Router::new()
        .route("/invoices", get(invoices::list_all).post(invoices::create))
        .route("/invoices/sent", get(invoices::list_sent))
        .route("/invoices/received", get(invoices::list_received))
        .route("/invoices/export", get(invoices::export))
        .route(
            "/invoices/:invoice_id",
            get(invoices::get_one).delete(invoices::delete),
        )
        .route("/invoices/:invoice_id/view", get(invoices::view))
        .route("/invoices/:invoice_id/status", patch(invoices::update_status))
        .route(
            "/invoices/:invoice_id/payments",
            get(invoices::list_payments).post(invoices::create_payment),
        )
        .route("/contacts", get(contacts::list_all).post(contacts::create))
        .route("/contacts/vendors", get(contacts::list_vendors))
        .route("/contacts/clients", get(contacts::list_clients))
        .route("/contacts/:contact_id", get(contacts::get_one));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/invoices/preview", post(handlers::preview_totals))
        .route("/api/users", get(users::list))
        .route("/api/users/:user_id", get(users::get_one))
        .route("/api/users/:user_id/companies", get(users::companies))
        .nest("/api/companies/:company_id", company_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
