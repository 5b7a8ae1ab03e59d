use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::search::push_search;
use crate::models::invoice::ValidatedItem;
use crate::models::{
    FilterOption, Invoice, InvoiceDirection, InvoiceItem, InvoiceListItem, InvoiceSearchColumn,
    InvoiceStatus,
};

const INVOICE_COLUMNS: &str = "i.id, i.company_id, i.contact_id, i.direction, i.invoice_number, \
     i.status, i.issue_date, i.due_date, i.paid_date, i.subtotal, i.tax_total, i.discount_amount, \
     i.total_amount, i.currency, i.notes, i.terms, i.created_at, i.updated_at, i.sent_at, i.viewed_at";

const ITEM_COLUMNS: &str = "id, invoice_id, position, description, quantity, unit_type, unit_price, \
     tax_rate, subtotal, tax_amount, total, created_at";

/// Serialises invoice number assignment across concurrent creates.
const NUMBERING_LOCK_KEY: i64 = 0x1A70_1CE5;

const LAST_NUMBER_SQL: &str =
    "SELECT invoice_number FROM invoices ORDER BY created_at DESC, invoice_number DESC LIMIT 1";

/// Whitelisted sort column; anything else sorts by creation time.
pub fn sort_column(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("invoiceNumber") => "i.invoice_number",
        Some("issueDate") => "i.issue_date",
        Some("dueDate") => "i.due_date",
        Some("totalAmount") => "i.total_amount",
        Some("status") => "i.status",
        _ => "i.created_at",
    }
}

fn push_where(
    qb: &mut QueryBuilder<'static, Postgres>,
    company_id: Uuid,
    direction: Option<InvoiceDirection>,
    filter: &FilterOption,
) {
    qb.push(" WHERE i.company_id = ").push_bind(company_id);
    if let Some(d) = direction {
        qb.push(" AND i.direction = ").push_bind(d);
    }
    if let Some(s) = filter.status {
        qb.push(" AND i.status = ").push_bind(s);
    }
    if let Some(term) = filter.search_term() {
        push_search(qb, term, &filter.search_columns::<InvoiceSearchColumn>());
    }
}

fn select_list(
    company_id: Uuid,
    direction: Option<InvoiceDirection>,
    filter: &FilterOption,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {}, ct.name AS contact_name, ct.email AS contact_email \
         FROM invoices i JOIN contacts ct ON ct.id = i.contact_id",
        INVOICE_COLUMNS
    ));
    push_where(&mut qb, company_id, direction, filter);
    qb.push(format!(
        " ORDER BY {} {}, i.id",
        sort_column(filter.sort_by.as_deref()),
        filter.sort_order().as_sql()
    ));
    qb
}

pub fn count_query(
    company_id: Uuid,
    direction: Option<InvoiceDirection>,
    filter: &FilterOption,
) -> QueryBuilder<'static, Postgres> {
    let mut qb =
        QueryBuilder::new("SELECT COUNT(*) FROM invoices i JOIN contacts ct ON ct.id = i.contact_id");
    push_where(&mut qb, company_id, direction, filter);
    qb
}

pub fn page_query(
    company_id: Uuid,
    direction: Option<InvoiceDirection>,
    filter: &FilterOption,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_list(company_id, direction, filter);
    qb.push(" LIMIT ").push_bind(i64::from(filter.page_size()));
    qb.push(" OFFSET ").push_bind(filter.offset());
    qb
}

/// One page of invoices plus the unpaged match count
pub async fn list_invoices(
    pool: &PgPool,
    company_id: Uuid,
    direction: Option<InvoiceDirection>,
    filter: &FilterOption,
) -> Result<(i64, Vec<InvoiceListItem>), sqlx::Error> {
    let mut count_qb = count_query(company_id, direction, filter);
    let mut page_qb = page_query(company_id, direction, filter);

    let (total, rows) = futures::try_join!(
        count_qb.build_query_scalar::<i64>().fetch_one(pool),
        page_qb.build_query_as::<InvoiceListItem>().fetch_all(pool),
    )?;
    Ok((total, rows))
}

/// Every matching invoice, unpaged (CSV export)
pub async fn list_all_invoices(
    pool: &PgPool,
    company_id: Uuid,
    direction: Option<InvoiceDirection>,
    filter: &FilterOption,
) -> Result<Vec<InvoiceListItem>, sqlx::Error> {
    let mut qb = select_list(company_id, direction, filter);
    let rows = qb.build_query_as::<InvoiceListItem>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn get_invoice(
    pool: &PgPool,
    company_id: Uuid,
    invoice_id: Uuid,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(&format!(
        "SELECT {} FROM invoices i WHERE i.company_id = $1 AND i.id = $2",
        INVOICE_COLUMNS
    ))
    .bind(company_id)
    .bind(invoice_id)
    .fetch_optional(pool)
    .await
}

/// Same as [`get_invoice`] but locks the row for the rest of the transaction.
pub async fn get_invoice_for_update(
    conn: &mut PgConnection,
    company_id: Uuid,
    invoice_id: Uuid,
) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(&format!(
        "SELECT {} FROM invoices i WHERE i.company_id = $1 AND i.id = $2 FOR UPDATE",
        INVOICE_COLUMNS
    ))
    .bind(company_id)
    .bind(invoice_id)
    .fetch_optional(conn)
    .await
}

pub async fn list_items(pool: &PgPool, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceItem>(&format!(
        "SELECT {} FROM invoice_items WHERE invoice_id = $1 ORDER BY position",
        ITEM_COLUMNS
    ))
    .bind(invoice_id)
    .fetch_all(pool)
    .await
}

/// Take the numbering lock and read the most recent invoice number.
pub async fn lock_last_invoice_number(conn: &mut PgConnection) -> Result<Option<String>, sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(NUMBERING_LOCK_KEY)
        .execute(&mut *conn)
        .await?;

    sqlx::query_scalar::<_, String>(LAST_NUMBER_SQL)
        .fetch_optional(&mut *conn)
        .await
}

/// Column values for a new invoice header.
#[derive(Debug, Clone)]
pub struct InvoiceRow<'a> {
    pub company_id: Uuid,
    pub contact_id: Uuid,
    pub direction: InvoiceDirection,
    pub invoice_number: &'a str,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub subtotal: BigDecimal,
    pub tax_total: BigDecimal,
    pub total_amount: BigDecimal,
    pub currency: &'a str,
    pub notes: Option<&'a str>,
    pub terms: Option<&'a str>,
}

/// `created_at` is wall-clock time, taken after the numbering lock, so that
/// creation order matches number order.
fn insert_invoice_sql() -> String {
    format!(
        r#"
        INSERT INTO invoices AS i (
            id, company_id, contact_id, direction, invoice_number, status,
            issue_date, due_date, subtotal, tax_total, total_amount, currency, notes, terms,
            created_at, updated_at
        )
        VALUES (
            $1, $2, $3, $4, $5, 'draft', $6, $7, $8, $9, $10, $11, $12, $13,
            clock_timestamp(), clock_timestamp()
        )
        RETURNING {}
        "#,
        INVOICE_COLUMNS
    )
}

pub async fn insert_invoice(conn: &mut PgConnection, row: &InvoiceRow<'_>) -> Result<Invoice, sqlx::Error> {
    sqlx::query_as::<_, Invoice>(&insert_invoice_sql())
        .bind(Uuid::new_v4())
        .bind(row.company_id)
        .bind(row.contact_id)
        .bind(row.direction)
        .bind(row.invoice_number)
        .bind(row.issue_date)
        .bind(row.due_date)
        .bind(&row.subtotal)
        .bind(&row.tax_total)
        .bind(&row.total_amount)
        .bind(row.currency)
        .bind(row.notes)
        .bind(row.terms)
        .fetch_one(conn)
        .await
}

/// Batch insert of line items, each with its rounded totals.
pub async fn insert_items(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    items: &[ValidatedItem],
) -> Result<Vec<InvoiceItem>, sqlx::Error> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut query_builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO invoice_items (
            id, invoice_id, position, description, quantity, unit_type,
            unit_price, tax_rate, subtotal, tax_amount, total
        ) ",
    );

    query_builder.push_values(items.iter().enumerate(), |mut b, (position, item)| {
        b.push_bind(Uuid::new_v4())
            .push_bind(invoice_id)
            .push_bind(position as i32)
            .push_bind(item.description.clone())
            .push_bind(item.quantity.clone())
            .push_bind(item.unit_type.clone())
            .push_bind(item.unit_price.clone())
            .push_bind(item.tax_rate.clone())
            .push_bind(crate::service::format::to_money(item.totals.subtotal))
            .push_bind(crate::service::format::to_money(item.totals.tax_amount))
            .push_bind(crate::service::format::to_money(item.totals.total));
    });
    query_builder.push(format!(" RETURNING {}", ITEM_COLUMNS));

    let mut rows = query_builder
        .build_query_as::<InvoiceItem>()
        .fetch_all(conn)
        .await?;
    rows.sort_by_key(|r| r.position);
    Ok(rows)
}

/// Timestamp column recording when an invoice reached `status`, if any.
pub fn stamp_column(status: InvoiceStatus) -> Option<&'static str> {
    match status {
        InvoiceStatus::Sent => Some("sent_at"),
        InvoiceStatus::Viewed => Some("viewed_at"),
        InvoiceStatus::Paid => Some("paid_date"),
        InvoiceStatus::Draft | InvoiceStatus::Overdue | InvoiceStatus::Cancelled => None,
    }
}

/// Set the status and stamp the matching timestamp column.
pub async fn update_status(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    status: InvoiceStatus,
    at: DateTime<Utc>,
) -> Result<Invoice, sqlx::Error> {
    let stamp = stamp_column(status)
        .map(|column| format!(", {} = $3", column))
        .unwrap_or_default();

    let sql = format!(
        "UPDATE invoices AS i SET status = $2, updated_at = $3{} WHERE i.id = $1 RETURNING {}",
        stamp, INVOICE_COLUMNS
    );

    sqlx::query_as::<_, Invoice>(&sql)
        .bind(invoice_id)
        .bind(status)
        .bind(at)
        .fetch_one(conn)
        .await
}

/// Returns whether a row was deleted.
pub async fn delete_invoice(pool: &PgPool, company_id: Uuid, invoice_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM invoices WHERE company_id = $1 AND id = $2")
        .bind(company_id)
        .bind(invoice_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_is_whitelisted() {
        assert_eq!(sort_column(Some("dueDate")), "i.due_date");
        assert_eq!(sort_column(Some("totalAmount")), "i.total_amount");
        assert_eq!(sort_column(Some("1; --")), "i.created_at");
    }

    #[test]
    fn status_changes_stamp_their_column() {
        assert_eq!(stamp_column(InvoiceStatus::Sent), Some("sent_at"));
        assert_eq!(stamp_column(InvoiceStatus::Viewed), Some("viewed_at"));
        assert_eq!(stamp_column(InvoiceStatus::Paid), Some("paid_date"));
        assert_eq!(stamp_column(InvoiceStatus::Draft), None);
        assert_eq!(stamp_column(InvoiceStatus::Overdue), None);
        assert_eq!(stamp_column(InvoiceStatus::Cancelled), None);
    }

    #[test]
    fn new_invoices_take_wall_clock_creation_time() {
        let sql = insert_invoice_sql();
        assert!(sql.contains("created_at, updated_at"));
        assert!(sql.contains("clock_timestamp(), clock_timestamp()"));
        assert!(LAST_NUMBER_SQL.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn sent_listing_filters_direction_and_status() {
        let filter = FilterOption {
            status: Some(InvoiceStatus::Overdue),
            sort_by: Some("dueDate".into()),
            sort_order: Some(crate::models::SortOrder::Asc),
            ..Default::default()
        };
        let qb = page_query(Uuid::nil(), Some(InvoiceDirection::Sent), &filter);
        let sql = qb.sql();
        assert!(sql.contains("JOIN contacts ct ON ct.id = i.contact_id"));
        assert!(sql.contains("WHERE i.company_id = $1 AND i.direction = $2 AND i.status = $3"));
        assert!(sql.ends_with("ORDER BY i.due_date ASC, i.id LIMIT $4 OFFSET $5"));
    }

    #[test]
    fn search_uses_default_columns() {
        let filter = FilterOption {
            search: Some("INV-2026".into()),
            ..Default::default()
        };
        let qb = count_query(Uuid::nil(), None, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM invoices i JOIN contacts ct ON ct.id = i.contact_id \
             WHERE i.company_id = $1 AND (i.invoice_number ILIKE $2 OR ct.name ILIKE $3)"
        );
    }
}
