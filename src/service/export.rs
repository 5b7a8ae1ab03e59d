use std::io::Write;

use crate::models::InvoiceListItem;

const HEADER: [&str; 11] = [
    "invoice_number",
    "direction",
    "status",
    "contact",
    "issue_date",
    "due_date",
    "currency",
    "subtotal",
    "tax_total",
    "total_amount",
    "paid_date",
];

fn direction_str(row: &InvoiceListItem) -> &'static str {
    match row.invoice.direction {
        crate::models::InvoiceDirection::Sent => "sent",
        crate::models::InvoiceDirection::Received => "received",
    }
}

/// Write invoice rows as CSV, header first.
pub fn write_invoices_csv<W: Write>(out: W, rows: &[InvoiceListItem]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for row in rows {
        let inv = &row.invoice;
        writer.write_record(&[
            inv.invoice_number.clone(),
            direction_str(row).to_string(),
            inv.status.as_str().to_string(),
            row.contact_name.clone(),
            inv.issue_date.format("%Y-%m-%d").to_string(),
            inv.due_date.format("%Y-%m-%d").to_string(),
            inv.currency.clone(),
            inv.subtotal.to_string(),
            inv.tax_total.to_string(),
            inv.total_amount.to_string(),
            inv.paid_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Invoice, InvoiceDirection, InvoiceStatus};
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn row(number: &str, contact: &str) -> InvoiceListItem {
        let day = Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap();
        InvoiceListItem {
            invoice: Invoice {
                id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                contact_id: Uuid::new_v4(),
                direction: InvoiceDirection::Received,
                invoice_number: number.into(),
                status: InvoiceStatus::Overdue,
                issue_date: day,
                due_date: day,
                paid_date: None,
                subtotal: BigDecimal::from_str("100.00").unwrap(),
                tax_total: BigDecimal::from_str("10.00").unwrap(),
                discount_amount: BigDecimal::default(),
                total_amount: BigDecimal::from_str("110.00").unwrap(),
                currency: "EUR".into(),
                notes: None,
                terms: None,
                created_at: day,
                updated_at: day,
                sent_at: None,
                viewed_at: None,
            },
            contact_name: contact.into(),
            contact_email: None,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let mut buf = Vec::new();
        write_invoices_csv(&mut buf, &[row("INV-2026-0001", "Acme, Inc.")]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), HEADER.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "INV-2026-0001,received,overdue,\"Acme, Inc.\",2026-04-02,2026-04-02,EUR,100.00,10.00,110.00,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_export_is_just_the_header() {
        let mut buf = Vec::new();
        write_invoices_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
