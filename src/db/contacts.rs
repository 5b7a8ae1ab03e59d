use crate::db::search::push_search;
use crate::models::{Contact, ContactSearchColumn, ContactType, FilterOption, NewContact};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const CONTACT_COLUMNS: &str = "ct.id, ct.company_id, ct.contact_type, ct.name, ct.email, ct.phone, \
     ct.mobile_phone, ct.address, ct.tax_id, ct.created_at, ct.updated_at";

/// Whitelisted sort column; anything else sorts by creation time.
pub fn sort_column(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("name") => "ct.name",
        _ => "ct.created_at",
    }
}

fn push_where(
    qb: &mut QueryBuilder<'static, Postgres>,
    company_id: Uuid,
    contact_type: Option<ContactType>,
    filter: &FilterOption,
) {
    qb.push(" WHERE ct.company_id = ").push_bind(company_id);
    if let Some(t) = contact_type {
        qb.push(" AND ct.contact_type = ").push_bind(t);
    }
    if let Some(term) = filter.search_term() {
        push_search(qb, term, &filter.search_columns::<ContactSearchColumn>());
    }
}

pub fn count_query(
    company_id: Uuid,
    contact_type: Option<ContactType>,
    filter: &FilterOption,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM contacts ct");
    push_where(&mut qb, company_id, contact_type, filter);
    qb
}

pub fn page_query(
    company_id: Uuid,
    contact_type: Option<ContactType>,
    filter: &FilterOption,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM contacts ct", CONTACT_COLUMNS));
    push_where(&mut qb, company_id, contact_type, filter);
    qb.push(format!(
        " ORDER BY {} {}, ct.id",
        sort_column(filter.sort_by.as_deref()),
        filter.sort_order().as_sql()
    ));
    qb.push(" LIMIT ").push_bind(i64::from(filter.page_size()));
    qb.push(" OFFSET ").push_bind(filter.offset());
    qb
}

/// One page of contacts plus the unpaged match count
pub async fn list_contacts(
    pool: &PgPool,
    company_id: Uuid,
    contact_type: Option<ContactType>,
    filter: &FilterOption,
) -> Result<(i64, Vec<Contact>), sqlx::Error> {
    let mut count_qb = count_query(company_id, contact_type, filter);
    let mut page_qb = page_query(company_id, contact_type, filter);

    let (total, rows) = futures::try_join!(
        count_qb.build_query_scalar::<i64>().fetch_one(pool),
        page_qb.build_query_as::<Contact>().fetch_all(pool),
    )?;
    Ok((total, rows))
}

pub async fn get_contact(
    pool: &PgPool,
    company_id: Uuid,
    contact_id: Uuid,
) -> Result<Option<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>(&format!(
        "SELECT {} FROM contacts ct WHERE ct.company_id = $1 AND ct.id = $2",
        CONTACT_COLUMNS
    ))
    .bind(company_id)
    .bind(contact_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_contact(
    pool: &PgPool,
    company_id: Uuid,
    contact: &NewContact,
) -> Result<Contact, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (id, company_id, contact_type, name, email, phone, mobile_phone, address, tax_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, company_id, contact_type, name, email, phone, mobile_phone, address, tax_id,
                  created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(contact.contact_type)
    .bind(contact.name.trim())
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(&contact.mobile_phone)
    .bind(&contact.address)
    .bind(&contact.tax_id)
    .fetch_one(pool)
    .await
}
