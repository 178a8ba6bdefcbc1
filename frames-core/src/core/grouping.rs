//! Month-based grouping of entries for display.
//!
//! Groups are keyed by the semantic `(year, month)` pair of each entry's
//! timestamp in a caller-supplied time zone. The display label is derived
//! from the key and is never parsed back.

use crate::Entry;
use chrono::{Datelike, TimeZone};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Calendar month used as a grouping key. Orders by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
}

/// One month's worth of entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup {
    pub key: MonthKey,
    /// Display label such as `"February 2024"`.
    pub label: String,
    pub entries: Vec<Entry>,
}

/// Partitions `entries` by calendar month of their timestamp in `tz`.
///
/// Groups come back most recent month first. Within a group the input order
/// is kept, so feeding in a newest-first list yields newest-first groups.
pub fn group_by_month<Tz>(entries: Vec<Entry>, tz: &Tz) -> Vec<MonthGroup>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut groups: BTreeMap<Reverse<MonthKey>, MonthGroup> = BTreeMap::new();

    for entry in entries {
        let local = entry.timestamp.with_timezone(tz);
        let key = MonthKey { year: local.year(), month: local.month() };
        groups
            .entry(Reverse(key))
            .or_insert_with(|| MonthGroup {
                key,
                label: local.format("%B %Y").to_string(),
                entries: Vec::new(),
            })
            .entries
            .push(entry);
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn entry_at(id: &str, rfc3339: &str) -> Entry {
        Entry {
            id: id.to_string(),
            timestamp: chrono::DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
            main: id.to_string(),
            details: String::new(),
            picture: None,
            has_picture: false,
            is_bookmarked: false,
        }
    }

    #[test]
    fn test_groups_by_month_newest_first() {
        // Newest-first input, as produced by the store listing.
        let entries = vec![
            entry_at("feb-01", "2024-02-01T09:00:00Z"),
            entry_at("jan-20", "2024-01-20T09:00:00Z"),
            entry_at("jan-15", "2024-01-15T09:00:00Z"),
        ];

        let groups = group_by_month(entries, &Utc);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "February 2024");
        assert_eq!(groups[0].key, MonthKey { year: 2024, month: 2 });
        assert_eq!(groups[0].entries.len(), 1);
        assert_eq!(groups[1].label, "January 2024");
        let ids: Vec<&str> = groups[1].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["jan-20", "jan-15"]);
    }

    #[test]
    fn test_groups_sort_by_year_before_month() {
        // "December 2023" would sort after "January 2024" as a string.
        let entries = vec![
            entry_at("dec", "2023-12-31T12:00:00Z"),
            entry_at("jan", "2024-01-01T12:00:00Z"),
            entry_at("apr", "2023-04-10T12:00:00Z"),
        ];

        let labels: Vec<String> = group_by_month(entries, &Utc)
            .into_iter()
            .map(|g| g.label)
            .collect();

        assert_eq!(labels, vec!["January 2024", "December 2023", "April 2023"]);
    }

    #[test]
    fn test_month_is_computed_in_given_time_zone() {
        let entries = vec![entry_at("edge", "2024-01-31T23:30:00Z")];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let groups = group_by_month(entries, &plus_two);

        assert_eq!(groups[0].key, MonthKey { year: 2024, month: 2 });
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_by_month(Vec::new(), &Utc).is_empty());
    }
}
