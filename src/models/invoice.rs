use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::contact::Contact;
use super::payment::Payment;
use super::query::SearchColumn;
use crate::error::{AppError, AppResult};
use crate::service::format::{fits_numeric, to_money};
use crate::service::totals::{
    calculate_invoice_totals, calculate_item_total, InvoiceLineItem, InvoiceTotals, ItemTotal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Viewed => "viewed",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Cancelled invoices are frozen.
    pub fn is_final(&self) -> bool {
        matches!(self, InvoiceStatus::Cancelled)
    }

    /// Final statuses only accept a repeat of themselves.
    pub fn check_transition(&self, next: InvoiceStatus) -> AppResult<()> {
        if self.is_final() && *self != next {
            return Err(AppError::Conflict(format!(
                "a {} invoice cannot become {}",
                self.as_str(),
                next.as_str()
            )));
        }
        Ok(())
    }
}

/// Whether the company issued the invoice or received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invoice_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceDirection {
    Sent,
    Received,
}

/// Invoice header row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub company_id: Uuid,
    pub contact_id: Uuid,
    pub direction: InvoiceDirection,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub paid_date: Option<DateTime<Utc>>,
    pub subtotal: BigDecimal,
    pub tax_total: BigDecimal,
    pub discount_amount: BigDecimal,
    pub total_amount: BigDecimal,
    pub currency: String,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
}

/// Stored line item
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_type: String,
    pub unit_price: BigDecimal,
    pub tax_rate: BigDecimal,
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl From<&InvoiceItem> for InvoiceLineItem {
    fn from(item: &InvoiceItem) -> Self {
        InvoiceLineItem {
            description: item.description.clone(),
            quantity: item.quantity.to_string(),
            unit_type: item.unit_type.clone(),
            unit_price: item.unit_price.to_string(),
            tax_rate: item.tax_rate.to_string(),
        }
    }
}

/// Listing row: the invoice plus its counterparty's name and email.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub contact_name: String,
    pub contact_email: Option<String>,
}

/// Full invoice with relations and recomputed totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub contact: Contact,
    pub items: Vec<InvoiceItem>,
    pub payments: Vec<Payment>,
    pub totals: InvoiceTotals,
}

/// Body of a create-invoice request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub contact_id: Uuid,
    pub direction: InvoiceDirection,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub items: Vec<InvoiceLineItem>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// A line item whose numeric fields parsed cleanly, with its totals.
#[derive(Debug, Clone)]
pub struct ValidatedItem {
    pub description: String,
    pub quantity: BigDecimal,
    pub unit_type: String,
    pub unit_price: BigDecimal,
    pub tax_rate: BigDecimal,
    pub totals: ItemTotal,
}

impl NewInvoice {
    /// Strict checks before persisting. The calculator would quietly read bad
    /// numbers as zero; a stored invoice must not.
    pub fn validate(&self) -> AppResult<Vec<ValidatedItem>> {
        if self.items.is_empty() {
            return Err(AppError::Validation("invoice needs at least one item".into()));
        }
        if self.due_date < self.issue_date {
            return Err(AppError::Validation("due date is before issue date".into()));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::Validation(format!("invalid currency: {}", self.currency)));
        }

        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                if item.description.trim().is_empty() {
                    return Err(AppError::Validation(format!(
                        "item {}: description is required",
                        idx + 1
                    )));
                }
                let quantity = parse_decimal(idx, "quantity", &item.quantity, QUANTITY)?;
                let unit_price = parse_decimal(idx, "unitPrice", &item.unit_price, MONEY)?;
                let tax_rate = parse_decimal(idx, "taxRate", &item.tax_rate, TAX_RATE)?;

                let totals = calculate_item_total(item);
                if !fits_numeric(&to_money(totals.total), MONEY.0, MONEY.1) {
                    return Err(AppError::Validation(format!(
                        "item {}: total is too large",
                        idx + 1
                    )));
                }
                Ok(ValidatedItem {
                    description: item.description.trim().to_string(),
                    quantity,
                    unit_type: item.unit_type.trim().to_string(),
                    unit_price,
                    tax_rate,
                    totals,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let totals = calculate_invoice_totals(&self.items);
        if !fits_numeric(&to_money(totals.total), MONEY.0, MONEY.1) {
            return Err(AppError::Validation("invoice total is too large".into()));
        }
        Ok(items)
    }
}

/// (precision, scale) of the item columns in `invoice_items`.
const QUANTITY: (i64, i64) = (10, 2);
const MONEY: (i64, i64) = (12, 2);
const TAX_RATE: (i64, i64) = (5, 4);

/// Parses a numeric field and rejects values its column would round or overflow.
fn parse_decimal(idx: usize, field: &str, raw: &str, column: (i64, i64)) -> AppResult<BigDecimal> {
    let value = BigDecimal::from_str(raw.trim()).map_err(|_| {
        AppError::Validation(format!("item {}: {} is not a number: {:?}", idx + 1, field, raw))
    })?;
    if !fits_numeric(&value, column.0, column.1) {
        return Err(AppError::Validation(format!(
            "item {}: {} {} exceeds {} digits with {} decimals",
            idx + 1,
            field,
            raw.trim(),
            column.0,
            column.1
        )));
    }
    Ok(value)
}

/// Body of a status update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceSearchColumn {
    InvoiceNumber,
    Notes,
    Terms,
    Status,
    Currency,
    TotalAmount,
    CompanyName,
    ContactName,
    ContactEmail,
}

impl FromStr for InvoiceSearchColumn {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "invoiceNumber" => Self::InvoiceNumber,
            "notes" => Self::Notes,
            "terms" => Self::Terms,
            "status" => Self::Status,
            "currency" => Self::Currency,
            "totalAmount" => Self::TotalAmount,
            "companyName" => Self::CompanyName,
            "contactName" => Self::ContactName,
            "contactEmail" => Self::ContactEmail,
            _ => return Err(()),
        })
    }
}

impl SearchColumn for InvoiceSearchColumn {
    fn condition(&self) -> (&'static str, &'static str) {
        match self {
            Self::InvoiceNumber => ("i.invoice_number ILIKE ", ""),
            Self::Notes => ("i.notes ILIKE ", ""),
            Self::Terms => ("i.terms ILIKE ", ""),
            Self::Status => ("i.status::text ILIKE ", ""),
            Self::Currency => ("i.currency ILIKE ", ""),
            Self::TotalAmount => ("i.total_amount::text ILIKE ", ""),
            Self::CompanyName => (
                "EXISTS (SELECT 1 FROM companies co WHERE co.id = i.company_id AND co.name ILIKE ",
                ")",
            ),
            Self::ContactName => ("ct.name ILIKE ", ""),
            Self::ContactEmail => ("ct.email ILIKE ", ""),
        }
    }

    fn defaults() -> &'static [Self] {
        &[Self::InvoiceNumber, Self::ContactName]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn line(quantity: &str, unit_price: &str, tax_rate: &str) -> InvoiceLineItem {
        InvoiceLineItem {
            description: "Design work".into(),
            quantity: quantity.into(),
            unit_type: "hours".into(),
            unit_price: unit_price.into(),
            tax_rate: tax_rate.into(),
        }
    }

    fn new_invoice(items: Vec<InvoiceLineItem>) -> NewInvoice {
        NewInvoice {
            contact_id: Uuid::new_v4(),
            direction: InvoiceDirection::Sent,
            issue_date: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            due_date: Utc.with_ymd_and_hms(2026, 3, 31, 0, 0, 0).unwrap(),
            currency: "USD".into(),
            notes: None,
            terms: None,
            items,
        }
    }

    #[test]
    fn valid_items_carry_their_totals() {
        let validated = new_invoice(vec![line("2", "50", "0.1")]).validate().unwrap();
        assert_eq!(validated.len(), 1);
        assert_eq!(validated[0].quantity, BigDecimal::from(2));
        assert!((validated[0].totals.total - 110.0).abs() < 1e-9);
    }

    #[test]
    fn empty_invoice_is_rejected() {
        assert!(matches!(
            new_invoice(vec![]).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn non_numeric_quantity_is_rejected_before_storage() {
        let err = new_invoice(vec![line("", "50", "0.1")]).validate().unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn quantity_finer_than_cents_is_rejected() {
        let err = new_invoice(vec![line("0.333", "3", "0")]).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn values_too_large_for_their_columns_are_rejected() {
        let err = new_invoice(vec![line("1", "100", "10")]).validate().unwrap_err();
        assert!(err.to_string().contains("taxRate"));

        let err = new_invoice(vec![line("1e20", "1", "0")]).validate().unwrap_err();
        assert!(err.to_string().contains("quantity"));

        let err = new_invoice(vec![line("1", "12345678901.00", "0")]).validate().unwrap_err();
        assert!(err.to_string().contains("unitPrice"));
    }

    #[test]
    fn totals_that_overflow_money_columns_are_rejected() {
        let err = new_invoice(vec![line("99999999", "9999999999", "0")])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("total is too large"));

        let half = line("1", "6000000000", "0");
        let err = new_invoice(vec![half.clone(), half]).validate().unwrap_err();
        assert!(err.to_string().contains("invoice total"));
    }

    #[test]
    fn stored_precision_reproduces_validated_totals() {
        let validated = new_invoice(vec![line("0.33", "3.25", "0.0825")])
            .validate()
            .unwrap();
        let reread = InvoiceLineItem {
            description: "Design work".into(),
            quantity: validated[0].quantity.to_string(),
            unit_type: "hours".into(),
            unit_price: validated[0].unit_price.to_string(),
            tax_rate: validated[0].tax_rate.to_string(),
        };
        assert_eq!(
            to_money(calculate_item_total(&reread).total),
            to_money(validated[0].totals.total)
        );
    }

    #[test]
    fn due_date_before_issue_date_is_rejected() {
        let mut inv = new_invoice(vec![line("1", "1", "0")]);
        inv.due_date = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        assert!(inv.validate().is_err());
    }

    #[test]
    fn bad_currency_is_rejected() {
        let mut inv = new_invoice(vec![line("1", "1", "0")]);
        inv.currency = "US".into();
        assert!(inv.validate().is_err());
    }

    #[test]
    fn currency_defaults_to_usd() {
        let body = serde_json::json!({
            "contactId": Uuid::new_v4(),
            "direction": "received",
            "issueDate": "2026-03-01T00:00:00Z",
            "dueDate": "2026-03-31T00:00:00Z",
            "items": [],
        });
        let inv: NewInvoice = serde_json::from_value(body).unwrap();
        assert_eq!(inv.currency, "USD");
        assert_eq!(inv.direction, InvoiceDirection::Received);
    }

    #[test]
    fn cancelled_invoices_refuse_other_statuses() {
        let err = InvoiceStatus::Cancelled
            .check_transition(InvoiceStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "conflict: a cancelled invoice cannot become paid");
        assert!(InvoiceStatus::Cancelled
            .check_transition(InvoiceStatus::Cancelled)
            .is_ok());
    }

    #[test]
    fn open_invoices_move_freely() {
        assert!(InvoiceStatus::Draft.check_transition(InvoiceStatus::Sent).is_ok());
        assert!(InvoiceStatus::Paid.check_transition(InvoiceStatus::Overdue).is_ok());
        assert!(InvoiceStatus::Sent.check_transition(InvoiceStatus::Cancelled).is_ok());
    }

    #[test]
    fn only_cancelled_is_final() {
        assert!(InvoiceStatus::Cancelled.is_final());
        assert!(!InvoiceStatus::Paid.is_final());
        assert_eq!(InvoiceStatus::Overdue.as_str(), "overdue");
    }
}
