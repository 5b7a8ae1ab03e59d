//! Printable projection of an invoice, shared by the HTML viewer and the PDF
//! renderer: every amount already rounded and prefixed with its currency sign.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::format::{currency_sign, format_amount, format_money};
use super::totals::{calculate_item_total, parse_or_zero, InvoiceLineItem};
use crate::models::{Company, Contact, InvoiceDetail, InvoiceDirection, InvoiceStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl From<&Company> for Party {
    fn from(c: &Company) -> Self {
        Party {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            tax_id: c.tax_id.clone(),
        }
    }
}

impl From<&Contact> for Party {
    fn from(c: &Contact) -> Self {
        Party {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone().or_else(|| c.mobile_phone.clone()),
            address: c.address.clone(),
            tax_id: c.tax_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    pub description: String,
    pub quantity: String,
    pub unit_type: String,
    pub unit_price: String,
    /// Tax rate as a percentage, e.g. `10%`.
    pub tax_rate: String,
    pub subtotal: String,
    pub tax_amount: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub currency: String,
    pub currency_sign: String,
    pub issue_date: String,
    pub due_date: String,
    pub from: Party,
    pub to: Party,
    pub lines: Vec<DocumentLine>,
    pub subtotal: String,
    pub tax_total: String,
    pub total: String,
    pub notes: Option<String>,
    pub terms: Option<String>,
}

fn format_date(d: DateTime<Utc>) -> String {
    d.format("%B %-d, %Y").to_string()
}

fn format_rate(rate: f64) -> String {
    let pct = format!("{:.2}", rate * 100.0);
    let pct = pct.trim_end_matches('0').trim_end_matches('.');
    format!("{}%", pct)
}

impl InvoiceDocument {
    pub fn build(detail: &InvoiceDetail, company: &Company) -> Self {
        let invoice = &detail.invoice;
        let currency = invoice.currency.as_str();

        let (from, to) = match invoice.direction {
            InvoiceDirection::Sent => (Party::from(company), Party::from(&detail.contact)),
            InvoiceDirection::Received => (Party::from(&detail.contact), Party::from(company)),
        };

        let lines = detail
            .items
            .iter()
            .map(|item| {
                let line = InvoiceLineItem::from(item);
                let t = calculate_item_total(&line);
                DocumentLine {
                    description: line.description.clone(),
                    quantity: line.quantity.clone(),
                    unit_type: line.unit_type.clone(),
                    unit_price: format_money(parse_or_zero(&line.unit_price), currency),
                    tax_rate: format_rate(parse_or_zero(&line.tax_rate)),
                    subtotal: format_amount(t.subtotal),
                    tax_amount: format_amount(t.tax_amount),
                    total: format_money(t.total, currency),
                }
            })
            .collect();

        InvoiceDocument {
            invoice_number: invoice.invoice_number.clone(),
            status: invoice.status,
            currency: invoice.currency.clone(),
            currency_sign: currency_sign(currency),
            issue_date: format_date(invoice.issue_date),
            due_date: format_date(invoice.due_date),
            from,
            to,
            lines,
            subtotal: format_money(detail.totals.subtotal, currency),
            tax_total: format_money(detail.totals.tax_total, currency),
            total: format_money(detail.totals.total, currency),
            notes: invoice.notes.clone(),
            terms: invoice.terms.clone(),
        }
    }
}
