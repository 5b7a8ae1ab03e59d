use sqlx::{Postgres, QueryBuilder};

use crate::models::query::SearchColumn;

/// Escape `LIKE` wildcards so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Append ` AND (col ILIKE $n OR ...)` for a search term.
pub fn push_search<C: SearchColumn>(
    qb: &mut QueryBuilder<'_, Postgres>,
    term: &str,
    columns: &[C],
) {
    if columns.is_empty() {
        return;
    }

    let pattern = format!("%{}%", escape_like(term));
    qb.push(" AND (");
    for (idx, column) in columns.iter().enumerate() {
        if idx > 0 {
            qb.push(" OR ");
        }
        let (before, after) = column.condition();
        qb.push(before);
        qb.push_bind(pattern.clone());
        qb.push(after);
    }
    qb.push(")");
}
