use sqlx::PgPool;
use uuid::Uuid;

use crate::db::contacts as queries;
use crate::error::{AppError, AppResult};
use crate::models::{Contact, ContactType, FilterOption, NewContact, Paginated, Pagination};

/// Company address book: clients and vendors
pub struct ContactService {
    pool: PgPool,
}

impl ContactService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `contact_type = None` lists clients and vendors together.
    pub async fn list(
        &self,
        company_id: Uuid,
        contact_type: Option<ContactType>,
        filter: &FilterOption,
    ) -> AppResult<Paginated<Contact>> {
        let (total, data) = queries::list_contacts(&self.pool, company_id, contact_type, filter).await?;
        Ok(Paginated {
            data,
            pagination: Pagination::new(filter.page(), filter.page_size(), total),
        })
    }

    pub async fn get(&self, company_id: Uuid, contact_id: Uuid) -> AppResult<Contact> {
        queries::get_contact(&self.pool, company_id, contact_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("contact {}", contact_id)))
    }

    pub async fn create(&self, company_id: Uuid, new: NewContact) -> AppResult<Contact> {
        new.validate()?;
        let contact = queries::insert_contact(&self.pool, company_id, &new).await?;
        tracing::info!(
            "Contact {} ({:?}) added to company {}",
            contact.id,
            contact.contact_type,
            company_id
        );
        Ok(contact)
    }
}
