use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{contacts, invoices, payments as queries};
use crate::error::{AppError, AppResult};
use crate::models::payment::transaction_id;
use crate::models::{InvoiceStatus, NewPayment, Payment, PaymentStatus};

/// Records payments and settles the invoice they pay
pub struct PaymentService {
    pool: PgPool,
}

impl PaymentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, company_id: Uuid, invoice_id: Uuid) -> AppResult<Vec<Payment>> {
        invoices::get_invoice(&self.pool, company_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("invoice {}", invoice_id)))?;
        Ok(queries::list_payments(&self.pool, invoice_id).await?)
    }

    /// Insert a completed payment and mark the invoice paid, atomically.
    pub async fn create(
        &self,
        company_id: Uuid,
        invoice_id: Uuid,
        new: NewPayment,
    ) -> AppResult<Payment> {
        new.validate()?;
        let payer = contacts::get_contact(&self.pool, company_id, new.payer_id).await?;
        new.check_payer(payer.as_ref(), company_id)?;

        let mut tx = self.pool.begin().await?;
        let invoice = invoices::get_invoice_for_update(&mut *tx, company_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("invoice {}", invoice_id)))?;

        new.check_against(&invoice)?;

        let now = Utc::now();
        let payment = queries::insert_payment(
            &mut *tx,
            invoice.id,
            &new,
            PaymentStatus::Completed,
            &transaction_id(now),
            now,
        )
        .await?;
        invoices::update_status(&mut *tx, invoice.id, InvoiceStatus::Paid, now).await?;
        tx.commit().await?;

        tracing::info!(
            "Payment {} of {} {} recorded, invoice {} marked paid",
            payment.id,
            payment.amount,
            payment.currency,
            invoice.invoice_number
        );
        Ok(payment)
    }
}
