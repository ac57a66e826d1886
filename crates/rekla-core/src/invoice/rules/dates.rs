//! Date parsing for Norwegian invoices (day.month.year convention).

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_NORWEGIAN_LONG, DATE_YMD};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // DD.MM.YYYY, DD/MM/YYYY, DD-MM-YY
        for caps in DATE_DMY.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = parse_year(&caps[3]);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // YYYY-MM-DD
        for caps in DATE_YMD.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                if results.iter().any(|r| r.value == date) {
                    continue;
                }
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // "12. april 2023"
        for caps in DATE_NORWEGIAN_LONG.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = norwegian_month_to_number(&caps[2]);
            let year: i32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                if results.iter().any(|r| r.value == date) {
                    continue;
                }
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Parse the first date found in `text`, if any.
///
/// Unparseable input yields `None`, never a default date.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn norwegian_month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "januar" => 1,
        "februar" => 2,
        "mars" => 3,
        "april" => 4,
        "mai" => 5,
        "juni" => 6,
        "juli" => 7,
        "august" => 8,
        "september" => 9,
        "oktober" => 10,
        "november" => 11,
        "desember" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_date_dmy() {
        assert_eq!(
            extract_date("12.04.2023"),
            NaiveDate::from_ymd_opt(2023, 4, 12)
        );
    }

    #[test]
    fn test_extract_date_ymd() {
        assert_eq!(
            extract_date("2023-04-12"),
            NaiveDate::from_ymd_opt(2023, 4, 12)
        );
    }

    #[test]
    fn test_extract_date_norwegian_long() {
        assert_eq!(
            extract_date("12. april 2023"),
            NaiveDate::from_ymd_opt(2023, 4, 12)
        );
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(
            extract_date("02.03.23"),
            NaiveDate::from_ymd_opt(2023, 3, 2)
        );
    }

    #[test]
    fn test_invalid_date_left_absent() {
        assert_eq!(extract_date("31.02.2023"), None);
        assert_eq!(extract_date("snarest"), None);
    }
}
