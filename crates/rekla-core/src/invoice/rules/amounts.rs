//! Amount parsing and formatting for Norwegian invoices.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::NUMERIC_TOKEN;

/// True when a tokenizer token is a plain number or grouped amount.
pub fn is_numeric_token(token: &str) -> bool {
    NUMERIC_TOKEN.is_match(token)
}

/// Parse a Norwegian-formatted amount (e.g. "1 234,56", "1234,56", "1234.56").
///
/// Comma is the decimal separator; space and NBSP group thousands. A mixed
/// "1.234,56" form is also accepted with the dot as the grouping character.
pub fn parse_norwegian_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else if cleaned.contains(',') && cleaned.contains('.') {
        // Whichever separator comes last is the decimal one
        let comma_pos = cleaned.rfind(',');
        let dot_pos = cleaned.rfind('.');
        match (comma_pos, dot_pos) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            _ => cleaned.replace(',', ""),
        }
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount in Norwegian style (1 234,56).
pub fn format_norwegian_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let parts: Vec<&str> = s.split('.').collect();

    if parts.len() != 2 {
        return s;
    }

    let chars: Vec<char> = parts[0].chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 && *c != '-' {
            formatted.push(' ');
        }
        formatted.push(*c);
    }

    format!("{},{}", formatted, parts[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_norwegian_amount() {
        assert_eq!(
            parse_norwegian_amount("1 234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_norwegian_amount("1234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_norwegian_amount("1234.56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_norwegian_amount("11\u{00a0}597,00"),
            Some(Decimal::from_str("11597.00").unwrap())
        );
        assert_eq!(
            parse_norwegian_amount("1.234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(parse_norwegian_amount("kr"), None);
    }

    #[test]
    fn test_parse_quantity_token() {
        assert_eq!(
            parse_norwegian_amount("2,0"),
            Some(Decimal::from_str("2.0").unwrap())
        );
        assert_eq!(
            parse_norwegian_amount("8"),
            Some(Decimal::from_str("8").unwrap())
        );
    }

    #[test]
    fn test_format_norwegian_amount() {
        let amount = Decimal::from_str("1234.56").unwrap();
        assert_eq!(format_norwegian_amount(amount), "1 234,56");

        let amount = Decimal::from_str("42994").unwrap();
        assert_eq!(format_norwegian_amount(amount), "42 994,00");
    }
}
