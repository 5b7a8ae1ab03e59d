use crate::error::{AppError, AppResult};

/// Next invoice number after `last`, formatted `{prefix}-{year}-{seq:04}`.
///
/// The sequence is the trailing `-` segment of the previous number; anything
/// unparsable restarts at 1.
pub fn next_invoice_number(prefix: &str, year: i32, last: Option<&str>) -> AppResult<String> {
    let last_seq = last
        .and_then(|n| n.rsplit('-').next())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let seq = last_seq
        .checked_add(1)
        .ok_or_else(|| AppError::Conflict("invoice number sequence is exhausted".into()))?;
    Ok(format!("{}-{}-{:04}", prefix, year, seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_invoice_starts_at_one() {
        assert_eq!(next_invoice_number("INV", 2026, None).unwrap(), "INV-2026-0001");
    }

    #[test]
    fn continues_from_last_number() {
        assert_eq!(
            next_invoice_number("INV", 2026, Some("INV-2026-0041")).unwrap(),
            "INV-2026-0042"
        );
    }

    #[test]
    fn sequence_carries_across_years() {
        assert_eq!(
            next_invoice_number("INV", 2027, Some("INV-2026-0009")).unwrap(),
            "INV-2027-0010"
        );
    }

    #[test]
    fn unparsable_last_number_restarts() {
        assert_eq!(next_invoice_number("INV", 2026, Some("legacy")).unwrap(), "INV-2026-0001");
        assert_eq!(next_invoice_number("BILL", 2026, Some("INV-2026-")).unwrap(), "BILL-2026-0001");
    }

    #[test]
    fn sequence_continues_past_u32() {
        assert_eq!(
            next_invoice_number("INV", 2026, Some("INV-2026-4294967295")).unwrap(),
            "INV-2026-4294967296"
        );
    }

    #[test]
    fn exhausted_sequence_is_an_error() {
        let last = format!("INV-2026-{}", u64::MAX);
        assert!(matches!(
            next_invoice_number("INV", 2026, Some(&last)),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn widens_past_four_digits() {
        assert_eq!(
            next_invoice_number("INV", 2026, Some("INV-2026-9999")).unwrap(),
            "INV-2026-10000"
        );
    }
}
