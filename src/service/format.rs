use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Currency sign shown in front of amounts. Unknown codes fall back to the code itself.
pub fn currency_sign(code: &str) -> String {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "INR" => "₹".to_string(),
        "JPY" => "¥".to_string(),
        "CAD" => "CA$".to_string(),
        "AUD" => "A$".to_string(),
        other => format!("{} ", other),
    }
}

/// Two decimal places, no grouping.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_money(value: f64, currency: &str) -> String {
    format!("{}{}", currency_sign(currency), format_amount(value))
}

/// Round a calculator value to cents for a NUMERIC(12,2) column.
pub fn to_money(value: f64) -> BigDecimal {
    // format_amount always yields a plain decimal literal for finite input
    BigDecimal::from_str(&format_amount(value)).unwrap_or_default()
}

/// Whether `value` is stored exactly by a `NUMERIC(precision, scale)` column.
pub fn fits_numeric(value: &BigDecimal, precision: i64, scale: i64) -> bool {
    let normalized = value.abs().normalized();
    let (_, exponent) = normalized.as_bigint_and_exponent();
    if exponent > scale {
        return false;
    }
    let integer_digits = normalized.digits() as i64 - exponent;
    integer_digits <= precision - scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_currencies_map_to_signs() {
        assert_eq!(currency_sign("USD"), "$");
        assert_eq!(currency_sign("eur"), "€");
        assert_eq!(currency_sign("GBP"), "£");
        assert_eq!(currency_sign("CHF"), "CHF ");
    }

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(format_amount(110.0), "110.00");
        assert_eq!(format_amount(0.1 + 0.2), "0.30");
        assert_eq!(format_money(230.0, "USD"), "$230.00");
        assert_eq!(format_money(12.5, "CHF"), "CHF 12.50");
    }

    #[test]
    fn to_money_rounds_to_cents() {
        assert_eq!(to_money(10.0), BigDecimal::from_str("10.00").unwrap());
        assert_eq!(to_money(33.333333), BigDecimal::from_str("33.33").unwrap());
        assert_eq!(to_money(f64::NAN), BigDecimal::default());
    }

    #[test]
    fn fits_numeric_checks_scale_and_size() {
        let dec = |s: &str| BigDecimal::from_str(s).unwrap();
        assert!(fits_numeric(&dec("12345678.99"), 10, 2));
        assert!(fits_numeric(&dec("100.00"), 10, 2));
        assert!(fits_numeric(&dec("0"), 5, 4));
        assert!(fits_numeric(&dec("0.0825"), 5, 4));
        assert!(fits_numeric(&dec("-3.5"), 10, 2));
        assert!(!fits_numeric(&dec("0.333"), 10, 2));
        assert!(!fits_numeric(&dec("123456789"), 10, 2));
        assert!(!fits_numeric(&dec("1e20"), 10, 2));
        assert!(!fits_numeric(&dec("10"), 5, 4));
    }
}
