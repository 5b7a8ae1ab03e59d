use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::contact::Contact;
use super::invoice::{Invoice, InvoiceStatus};
use crate::error::{AppError, AppResult};
use crate::service::format::fits_numeric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Payment recorded against an invoice
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub payer_id: Uuid,
    pub amount: BigDecimal,
    pub currency: String,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub payer_id: Uuid,
    pub amount: BigDecimal,
    pub currency: String,
    pub payment_method: String,
}

impl NewPayment {
    pub fn validate(&self) -> AppResult<()> {
        if self.amount <= BigDecimal::zero() {
            return Err(AppError::Validation("payment amount must be positive".into()));
        }
        if !fits_numeric(&self.amount, 12, 2) {
            return Err(AppError::Validation(format!(
                "payment amount {} does not fit 12 digits with 2 decimals",
                self.amount
            )));
        }
        if self.payment_method.trim().is_empty() {
            return Err(AppError::Validation("payment method is required".into()));
        }
        Ok(())
    }

    /// The payer must be a contact of the company that owns the invoice.
    pub fn check_payer(&self, payer: Option<&Contact>, company_id: Uuid) -> AppResult<()> {
        match payer {
            Some(c) if c.id == self.payer_id && c.company_id == company_id => Ok(()),
            _ => Err(AppError::Validation(format!(
                "payer {} is not a contact of this company",
                self.payer_id
            ))),
        }
    }

    /// Whether this payment may settle `invoice`.
    pub fn check_against(&self, invoice: &Invoice) -> AppResult<()> {
        if invoice.status == InvoiceStatus::Cancelled {
            return Err(AppError::Conflict(format!(
                "invoice {} is cancelled",
                invoice.invoice_number
            )));
        }
        if !invoice.currency.eq_ignore_ascii_case(self.currency.trim()) {
            return Err(AppError::Validation(format!(
                "payment currency {} does not match invoice currency {}",
                self.currency, invoice.currency
            )));
        }
        Ok(())
    }
}

/// Transaction reference for a payment made at `at`.
pub fn transaction_id(at: DateTime<Utc>) -> String {
    format!("txn_{}", at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactType, InvoiceDirection};
    use chrono::TimeZone;

    fn payment(amount: i64) -> NewPayment {
        NewPayment {
            payer_id: Uuid::new_v4(),
            amount: BigDecimal::from(amount),
            currency: "USD".into(),
            payment_method: "bank_account".into(),
        }
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(payment(0).validate().is_err());
        assert!(payment(-5).validate().is_err());
        assert!(payment(230).validate().is_ok());
    }

    #[test]
    fn amount_must_fit_money_column() {
        let mut p = payment(1);
        p.amount = "10.005".parse().unwrap();
        assert!(p.validate().is_err());
        p.amount = "99999999999".parse().unwrap();
        assert!(p.validate().is_err());
        p.amount = "9999999999.99".parse().unwrap();
        assert!(p.validate().is_ok());
    }

    fn invoice(status: InvoiceStatus, currency: &str) -> Invoice {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        Invoice {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            contact_id: Uuid::new_v4(),
            direction: InvoiceDirection::Sent,
            invoice_number: "INV-2026-0007".into(),
            status,
            issue_date: at,
            due_date: at,
            paid_date: None,
            subtotal: BigDecimal::from(200),
            tax_total: BigDecimal::from(30),
            discount_amount: BigDecimal::zero(),
            total_amount: BigDecimal::from(230),
            currency: currency.into(),
            notes: None,
            terms: None,
            created_at: at,
            updated_at: at,
            sent_at: None,
            viewed_at: None,
        }
    }

    fn contact(id: Uuid, company_id: Uuid) -> Contact {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        Contact {
            id,
            company_id,
            contact_type: ContactType::Client,
            name: "Acme".into(),
            email: None,
            phone: None,
            mobile_phone: None,
            address: None,
            tax_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn payer_must_belong_to_the_company() {
        let company = Uuid::new_v4();
        let p = payment(230);

        assert!(p.check_payer(Some(&contact(p.payer_id, company)), company).is_ok());
        assert!(matches!(
            p.check_payer(None, company),
            Err(AppError::Validation(_))
        ));
        let other_tenant = contact(p.payer_id, Uuid::new_v4());
        assert!(p.check_payer(Some(&other_tenant), company).is_err());
    }

    #[test]
    fn cancelled_invoice_cannot_be_paid() {
        let err = payment(230)
            .check_against(&invoice(InvoiceStatus::Cancelled, "USD"))
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[test]
    fn payment_currency_must_match_invoice() {
        let err = payment(230)
            .check_against(&invoice(InvoiceStatus::Sent, "EUR"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(payment(230)
            .check_against(&invoice(InvoiceStatus::Overdue, "usd"))
            .is_ok());
    }

    #[test]
    fn transaction_id_uses_epoch_millis() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(transaction_id(at), "txn_1767225600000");
    }
}
