// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Age and recency derived from repository timestamps
//!
//! Every function here fails soft: anything that cannot be read as an
//! instant in the past yields `None`.

use crate::schema::MetadataTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Mean Gregorian year length in days
pub const DAYS_PER_YEAR: f64 = 365.25;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Offset-bearing layouts besides RFC 3339
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Layouts without an offset; read as UTC
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp as a timezone-aware instant
#[must_use]
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(raw, fmt) {
            return Some(t.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

/// Fractional days from `then` to `now`; `None` when `then` is in the future
fn elapsed_days(then: DateTime<Utc>, now: DateTime<Utc>) -> Option<f64> {
    let millis = (now - then).num_milliseconds();
    if millis < 0 {
        return None;
    }
    Some(millis as f64 / 1000.0 / SECONDS_PER_DAY)
}

/// Years since `created_at`
#[must_use]
pub fn age_years(created_at: Option<&str>, now: DateTime<Utc>) -> Option<f64> {
    parse_timestamp(created_at)
        .and_then(|t| elapsed_days(t, now))
        .map(|days| days / DAYS_PER_YEAR)
}

/// Days since `pushed_at`
#[must_use]
pub fn days_since_push(pushed_at: Option<&str>, now: DateTime<Utc>) -> Option<f64> {
    parse_timestamp(pushed_at).and_then(|t| elapsed_days(t, now))
}

/// Fill the derived age and recency fields of every metadata row
///
/// Rows from a source without a created or pushed column get `None`.
pub fn derive(table: &mut MetadataTable, now: DateTime<Utc>) {
    for row in &mut table.rows {
        row.age_years = age_years(row.created_at.as_deref(), now);
        row.days_since_push = days_since_push(row.pushed_at.as_deref(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepositoryMetadata;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_age_years_from_rfc3339() {
        let age = age_years(Some("2024-01-01T00:00:00Z"), now()).unwrap();
        // 731 days, 2024 being a leap year
        assert!((age - 731.0 / DAYS_PER_YEAR).abs() < 1e-9);
    }

    #[test]
    fn test_age_years_fail_soft() {
        assert_eq!(age_years(None, now()), None);
        assert_eq!(age_years(Some("not-a-date"), now()), None);
        assert_eq!(age_years(Some(""), now()), None);
    }

    #[test]
    fn test_future_timestamp_is_missing() {
        assert_eq!(age_years(Some("2030-01-01T00:00:00Z"), now()), None);
    }

    #[test]
    fn test_days_since_push_is_fractional() {
        let pushed = (now() - Duration::hours(36)).to_rfc3339();
        let days = days_since_push(Some(&pushed), now()).unwrap();
        assert!((days - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_alternate_layouts() {
        let expected = Utc.with_ymd_and_hms(2020, 5, 17, 8, 30, 0).unwrap();

        assert_eq!(parse_timestamp(Some("2020-05-17T08:30:00Z")), Some(expected));
        assert_eq!(parse_timestamp(Some("2020-05-17T10:30:00+02:00")), Some(expected));
        assert_eq!(parse_timestamp(Some("2020-05-17 08:30:00+00:00")), Some(expected));
        assert_eq!(parse_timestamp(Some("2020-05-17 08:30:00")), Some(expected));
        assert_eq!(parse_timestamp(Some("2020-05-17T08:30:00.000")), Some(expected));
        assert_eq!(
            parse_timestamp(Some("2020-05-17")),
            Some(Utc.with_ymd_and_hms(2020, 5, 17, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_derive_without_source_columns() {
        let mut table = MetadataTable {
            fields: vec![],
            rows: vec![RepositoryMetadata {
                repo_key: "a".into(),
                ..Default::default()
            }],
        };

        derive(&mut table, now());

        assert_eq!(table.rows[0].age_years, None);
        assert_eq!(table.rows[0].days_since_push, None);
    }
}
