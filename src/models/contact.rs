use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::query::SearchColumn;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Client,
    Vendor,
}

/// Client or vendor of a company
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub company_id: Uuid,
    pub contact_type: ContactType,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub contact_type: ContactType,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

impl NewContact {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("contact name is required".into()));
        }
        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() && !email.contains('@') {
                return Err(AppError::Validation(format!("invalid email: {}", email)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactSearchColumn {
    Name,
    Email,
    Phone,
    MobilePhone,
    ContactType,
    CompanyName,
}

impl FromStr for ContactSearchColumn {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => Self::Name,
            "email" => Self::Email,
            "phone" => Self::Phone,
            "mobilePhone" => Self::MobilePhone,
            "contactType" => Self::ContactType,
            "companyName" => Self::CompanyName,
            _ => return Err(()),
        })
    }
}

impl SearchColumn for ContactSearchColumn {
    fn condition(&self) -> (&'static str, &'static str) {
        match self {
            Self::Name => ("ct.name ILIKE ", ""),
            Self::Email => ("ct.email ILIKE ", ""),
            Self::Phone => ("ct.phone ILIKE ", ""),
            Self::MobilePhone => ("ct.mobile_phone ILIKE ", ""),
            Self::ContactType => ("ct.contact_type::text ILIKE ", ""),
            Self::CompanyName => (
                "EXISTS (SELECT 1 FROM companies co WHERE co.id = ct.company_id AND co.name ILIKE ",
                ")",
            ),
        }
    }

    fn defaults() -> &'static [Self] {
        &[Self::Name, Self::Email]
    }
}
