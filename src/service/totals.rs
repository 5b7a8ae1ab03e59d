use serde::{Deserialize, Serialize};

/// One billable row as it arrives from the invoice form.
///
/// Numeric fields stay strings here: the form edits them as text and the
/// calculator must cope with half-typed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceLineItem {
    pub description: String,
    pub quantity: String,
    pub unit_type: String,
    pub unit_price: String,
    /// Decimal fraction, 0.10 = 10%.
    pub tax_rate: String,
}

/// Totals for a single line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTotal {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
}

/// Aggregate totals across an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax_total: f64,
    pub total: f64,
}

/// Parse-or-zero: empty, non-numeric and non-finite input all read as `0.0`.
pub fn parse_or_zero(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Compute subtotal, tax and total for one line item. Never fails, never rounds.
pub fn calculate_item_total(item: &InvoiceLineItem) -> ItemTotal {
    let quantity = parse_or_zero(&item.quantity);
    let unit_price = parse_or_zero(&item.unit_price);
    let tax_rate = parse_or_zero(&item.tax_rate);

    let subtotal = quantity * unit_price;
    let tax_amount = subtotal * tax_rate;

    ItemTotal {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

/// Sum item totals into invoice totals. An empty slice yields zeros.
pub fn calculate_invoice_totals(items: &[InvoiceLineItem]) -> InvoiceTotals {
    let (subtotal, tax_total) = items
        .iter()
        .map(calculate_item_total)
        .fold((0.0, 0.0), |(sub, tax), t| (sub + t.subtotal, tax + t.tax_amount));

    InvoiceTotals {
        subtotal,
        tax_total,
        total: subtotal + tax_total,
    }
}
