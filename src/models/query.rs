use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::str::FromStr;

use super::invoice::InvoiceStatus;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Table query parameters shared by the invoice and contact listings.
///
/// `columns` is a comma-separated list of search columns; `status` only
/// applies to invoice listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
    pub columns: Option<String>,
    pub status: Option<InvoiceStatus>,
}

impl FilterOption {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.page_size())
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Requested search columns, deduplicated in first-seen order.
    /// Unknown names are dropped; nothing valid falls back to `C::defaults()`.
    pub fn search_columns<C: SearchColumn>(&self) -> Vec<C> {
        let requested: IndexSet<C> = self
            .columns
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter_map(|c| c.trim().parse().ok())
            .collect();

        if requested.is_empty() {
            C::defaults().to_vec()
        } else {
            requested.into_iter().collect()
        }
    }
}

/// A searchable table column.
///
/// `condition` returns the SQL surrounding the bound `ILIKE` pattern, as
/// `(before, after)`.
pub trait SearchColumn: FromStr + Copy + Eq + Hash + 'static {
    fn condition(&self) -> (&'static str, &'static str);
    fn defaults() -> &'static [Self];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total_items: i64) -> Self {
        let size = i64::from(page_size.max(1));
        Self {
            page,
            page_size,
            total_items,
            total_pages: (total_items + size - 1) / size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
