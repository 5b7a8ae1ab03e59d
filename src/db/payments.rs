use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{NewPayment, Payment, PaymentStatus};

const PAYMENT_COLUMNS: &str = "id, invoice_id, payer_id, amount, currency, payment_method, status, \
     transaction_id, payment_date, created_at";

pub async fn list_payments(pool: &PgPool, invoice_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {} FROM payments WHERE invoice_id = $1 ORDER BY payment_date",
        PAYMENT_COLUMNS
    ))
    .bind(invoice_id)
    .fetch_all(pool)
    .await
}

pub async fn insert_payment(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    payment: &NewPayment,
    status: PaymentStatus,
    transaction_id: &str,
    paid_at: DateTime<Utc>,
) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        r#"
        INSERT INTO payments (
            id, invoice_id, payer_id, amount, currency, payment_method,
            status, transaction_id, payment_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        PAYMENT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(invoice_id)
    .bind(payment.payer_id)
    .bind(&payment.amount)
    .bind(payment.currency.trim().to_ascii_uppercase())
    .bind(payment.payment_method.trim())
    .bind(status)
    .bind(transaction_id)
    .bind(paid_at)
    .fetch_one(conn)
    .await
}
