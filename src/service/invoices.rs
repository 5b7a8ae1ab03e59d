use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::document::InvoiceDocument;
use super::export::write_invoices_csv;
use super::format::to_money;
use super::invoice_number::next_invoice_number;
use super::totals::{
    calculate_invoice_totals, calculate_item_total, InvoiceLineItem, InvoiceTotals, ItemTotal,
};
use crate::db::invoices::{self as queries, InvoiceRow};
use crate::db::{contacts, payments, users};
use crate::error::{AppError, AppResult};
use crate::models::{
    ContactType, FilterOption, Invoice, InvoiceDetail, InvoiceDirection, InvoiceListItem,
    InvoiceStatus, NewInvoice, Paginated, Pagination,
};

/// Live form summary: per-row totals in input order, plus the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsPreview {
    pub items: Vec<ItemTotal>,
    pub totals: InvoiceTotals,
}

pub fn preview_totals(items: &[InvoiceLineItem]) -> TotalsPreview {
    TotalsPreview {
        items: items.iter().map(calculate_item_total).collect(),
        totals: calculate_invoice_totals(items),
    }
}

/// Invoice reads and writes for one company at a time
pub struct InvoiceService {
    pool: PgPool,
    number_prefix: String,
}

impl InvoiceService {
    pub fn new(pool: PgPool, number_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            number_prefix: number_prefix.into(),
        }
    }

    /// Paged listing; `direction = None` lists sent and received together.
    pub async fn list(
        &self,
        company_id: Uuid,
        direction: Option<InvoiceDirection>,
        filter: &FilterOption,
    ) -> AppResult<Paginated<InvoiceListItem>> {
        let (total, data) = queries::list_invoices(&self.pool, company_id, direction, filter).await?;
        tracing::debug!(
            "Listed {} of {} invoices for company {}",
            data.len(),
            total,
            company_id
        );
        Ok(Paginated {
            data,
            pagination: Pagination::new(filter.page(), filter.page_size(), total),
        })
    }

    pub async fn get(&self, company_id: Uuid, invoice_id: Uuid) -> AppResult<InvoiceDetail> {
        let invoice = queries::get_invoice(&self.pool, company_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("invoice {}", invoice_id)))?;
        self.load_detail(invoice).await
    }

    async fn load_detail(&self, invoice: Invoice) -> AppResult<InvoiceDetail> {
        let (contact, items, payments) = futures::try_join!(
            contacts::get_contact(&self.pool, invoice.company_id, invoice.contact_id),
            queries::list_items(&self.pool, invoice.id),
            payments::list_payments(&self.pool, invoice.id),
        )?;
        let contact =
            contact.ok_or_else(|| AppError::NotFound(format!("contact {}", invoice.contact_id)))?;

        let lines: Vec<InvoiceLineItem> = items.iter().map(InvoiceLineItem::from).collect();
        let totals = calculate_invoice_totals(&lines);

        Ok(InvoiceDetail {
            invoice,
            contact,
            items,
            payments,
            totals,
        })
    }

    /// Printable view of an invoice.
    pub async fn document(&self, company_id: Uuid, invoice_id: Uuid) -> AppResult<InvoiceDocument> {
        let detail = self.get(company_id, invoice_id).await?;
        let company = users::get_company(&self.pool, company_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("company {}", company_id)))?;
        Ok(InvoiceDocument::build(&detail, &company))
    }

    /// Validate, total and store a new draft invoice with its items.
    pub async fn create(&self, company_id: Uuid, new: NewInvoice) -> AppResult<InvoiceDetail> {
        let items = new.validate()?;

        let contact = contacts::get_contact(&self.pool, company_id, new.contact_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("contact {}", new.contact_id)))?;
        let expected = match new.direction {
            InvoiceDirection::Sent => ContactType::Client,
            InvoiceDirection::Received => ContactType::Vendor,
        };
        if contact.contact_type != expected {
            return Err(AppError::Validation(format!(
                "{:?} invoices need a {:?} contact",
                new.direction, expected
            )));
        }

        let totals = calculate_invoice_totals(&new.items);
        let currency = new.currency.to_ascii_uppercase();

        let mut tx = self.pool.begin().await?;
        let last = queries::lock_last_invoice_number(&mut *tx).await?;
        let invoice_number =
            next_invoice_number(&self.number_prefix, Utc::now().year(), last.as_deref())?;

        let row = InvoiceRow {
            company_id,
            contact_id: contact.id,
            direction: new.direction,
            invoice_number: &invoice_number,
            issue_date: new.issue_date,
            due_date: new.due_date,
            subtotal: to_money(totals.subtotal),
            tax_total: to_money(totals.tax_total),
            total_amount: to_money(totals.total),
            currency: &currency,
            notes: new.notes.as_deref(),
            terms: new.terms.as_deref(),
        };
        let invoice = queries::insert_invoice(&mut *tx, &row).await?;
        let stored_items = queries::insert_items(&mut *tx, invoice.id, &items).await?;
        tx.commit().await?;

        tracing::info!(
            "Invoice {} created for company {}: {} items, total {}",
            invoice.invoice_number,
            company_id,
            stored_items.len(),
            invoice.total_amount
        );

        Ok(InvoiceDetail {
            invoice,
            contact,
            items: stored_items,
            payments: Vec::new(),
            totals,
        })
    }

    pub async fn update_status(
        &self,
        company_id: Uuid,
        invoice_id: Uuid,
        status: InvoiceStatus,
    ) -> AppResult<Invoice> {
        let mut tx = self.pool.begin().await?;
        let current = queries::get_invoice_for_update(&mut *tx, company_id, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("invoice {}", invoice_id)))?;

        current.status.check_transition(status)?;

        let updated = queries::update_status(&mut *tx, invoice_id, status, Utc::now()).await?;
        tx.commit().await?;

        tracing::info!(
            "Invoice {} status {} -> {}",
            updated.invoice_number,
            current.status.as_str(),
            updated.status.as_str()
        );
        Ok(updated)
    }

    pub async fn delete(&self, company_id: Uuid, invoice_id: Uuid) -> AppResult<()> {
        if !queries::delete_invoice(&self.pool, company_id, invoice_id).await? {
            return Err(AppError::NotFound(format!("invoice {}", invoice_id)));
        }
        tracing::info!("Invoice {} deleted from company {}", invoice_id, company_id);
        Ok(())
    }

    /// Filtered listing as CSV bytes, ignoring paging.
    pub async fn export_csv(
        &self,
        company_id: Uuid,
        direction: Option<InvoiceDirection>,
        filter: &FilterOption,
    ) -> AppResult<Vec<u8>> {
        let rows = queries::list_all_invoices(&self.pool, company_id, direction, filter).await?;
        let mut buf = Vec::new();
        write_invoices_csv(&mut buf, &rows)?;
        tracing::info!("Exported {} invoices for company {}", rows.len(), company_id);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(q: &str, p: &str, r: &str) -> InvoiceLineItem {
        InvoiceLineItem {
            quantity: q.into(),
            unit_price: p.into(),
            tax_rate: r.into(),
            ..Default::default()
        }
    }

    #[test]
    fn preview_keeps_row_order() {
        let preview = preview_totals(&[line("1", "100", "0.1"), line("", "50", "0.1")]);
        assert_eq!(preview.items.len(), 2);
        assert!((preview.items[0].total - 110.0).abs() < 1e-9);
        assert_eq!(preview.items[1], ItemTotal::default());
        assert!((preview.totals.total - 110.0).abs() < 1e-9);
    }

    #[test]
    fn preview_of_nothing_is_zero() {
        let preview = preview_totals(&[]);
        assert!(preview.items.is_empty());
        assert_eq!(preview.totals, InvoiceTotals::default());
    }
}
