//! Free-text query parsing.
//!
//! A query mixes date expressions and folder words, e.g. `3 days ago camera`
//! or `today download`. Date expressions are consumed by three passes in
//! fixed priority; whatever is left over, rejoined in the original order,
//! becomes the folder substring.

use chrono::{Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::models::QueryFilter;

/// Parse a query against the current local date.
pub fn parse_query(query: &str) -> QueryFilter {
    parse_query_at(query, Local::now().date_naive())
}

/// Parse a query with an explicit "today", so relative date expressions are
/// deterministic under test.
///
/// Three consuming passes run left to right, each skipping tokens a prior
/// pass already consumed:
///
/// 1. `<N> days ago` - the bounds of that single day
/// 2. `<N> days`     - start of day (N-1) days ago through end of today
/// 3. `today` / `yesterday`; `phone` / `sdcard` are consumed but have no
///    filter effect (volume hints, reserved)
///
/// When several date expressions match within one pass, the last match in
/// scan order overwrites earlier ones. That tie-break is deliberate and
/// mirrors the consuming-pass design, not an accident of iteration order.
pub fn parse_query_at(query: &str, today: NaiveDate) -> QueryFilter {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.is_empty() {
        return QueryFilter::default();
    }

    let mut used = vec![false; tokens.len()];
    let mut date_range: Option<(i64, i64)> = None;

    // Pass 1: `<N> days ago`
    for i in 0..tokens.len().saturating_sub(2) {
        if used[i] || used[i + 1] || used[i + 2] {
            continue;
        }
        if tokens[i + 1].eq_ignore_ascii_case("days") && tokens[i + 2].eq_ignore_ascii_case("ago") {
            if let Ok(days) = tokens[i].parse::<i64>() {
                date_range = Some(day_bounds(days_before(today, days)));
                used[i] = true;
                used[i + 1] = true;
                used[i + 2] = true;
            }
        }
    }

    // Pass 2: `<N> days` means the last N days including today.
    for i in 0..tokens.len().saturating_sub(1) {
        if used[i] || used[i + 1] {
            continue;
        }
        if tokens[i + 1].eq_ignore_ascii_case("days") {
            if let Ok(days) = tokens[i].parse::<i64>() {
                let (start, _) = day_bounds(days_before(today, days - 1));
                let (_, end) = day_bounds(today);
                date_range = Some((start, end));
                used[i] = true;
                used[i + 1] = true;
            }
        }
    }

    // Pass 3: single keywords.
    for i in 0..tokens.len() {
        if used[i] {
            continue;
        }
        match tokens[i].to_ascii_lowercase().as_str() {
            "today" => {
                date_range = Some(day_bounds(today));
                used[i] = true;
            }
            "yesterday" => {
                date_range = Some(day_bounds(days_before(today, 1)));
                used[i] = true;
            }
            // Volume hints, reserved: consumed without any filter effect.
            "phone" | "sdcard" => {
                used[i] = true;
            }
            _ => {}
        }
    }

    let folder = tokens
        .iter()
        .zip(&used)
        .filter(|(_, consumed)| !**consumed)
        .map(|(token, _)| *token)
        .collect::<Vec<_>>()
        .join(" ");

    QueryFilter {
        date_range,
        folder: if folder.is_empty() { None } else { Some(folder) },
        type_filter: Default::default(),
    }
}

fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .unwrap_or(date)
}

/// Inclusive epoch-second bounds of a local calendar day, 00:00:00 through
/// 23:59:59.
pub(crate) fn day_bounds(date: NaiveDate) -> (i64, i64) {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    (
        local_epoch(date.and_time(NaiveTime::MIN)),
        local_epoch(date.and_time(end_of_day)),
    )
}

fn local_epoch(naive: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp(),
        // DST fold: take the earlier wall-clock reading.
        LocalResult::Ambiguous(dt, _) => dt.timestamp(),
        // DST gap: the naive time does not exist locally.
        LocalResult::None => naive.and_utc().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
    }

    #[test]
    fn test_days_ago_is_a_single_day() {
        let filter = parse_query_at("3 days ago", fixed_today());
        let expected = day_bounds(NaiveDate::from_ymd_opt(2023, 6, 12).unwrap());
        assert_eq!(filter.date_range, Some(expected));
        assert_eq!(filter.folder, None);
    }

    #[test]
    fn test_days_spans_until_end_of_today() {
        let filter = parse_query_at("3 days", fixed_today());
        let (start, _) = day_bounds(NaiveDate::from_ymd_opt(2023, 6, 13).unwrap());
        let (_, end) = day_bounds(fixed_today());
        assert_eq!(filter.date_range, Some((start, end)));
    }

    #[test]
    fn test_today_with_folder_words() {
        let filter = parse_query_at("today some folder", fixed_today());
        assert_eq!(filter.date_range, Some(day_bounds(fixed_today())));
        assert_eq!(filter.folder.as_deref(), Some("some folder"));
    }

    #[test]
    fn test_yesterday() {
        let filter = parse_query_at("yesterday", fixed_today());
        let expected = day_bounds(NaiveDate::from_ymd_opt(2023, 6, 14).unwrap());
        assert_eq!(filter.date_range, Some(expected));
    }

    #[test]
    fn test_volume_hints_are_consumed_but_inert() {
        let filter = parse_query_at("phone camera sdcard", fixed_today());
        assert_eq!(filter.date_range, None);
        assert_eq!(filter.folder.as_deref(), Some("camera"));
    }

    #[test]
    fn test_last_date_expression_wins_within_a_pass() {
        let filter = parse_query_at("2 days ago 5 days ago", fixed_today());
        let expected = day_bounds(NaiveDate::from_ymd_opt(2023, 6, 10).unwrap());
        assert_eq!(filter.date_range, Some(expected));
        assert_eq!(filter.folder, None);
    }

    #[test]
    fn test_folder_tokens_keep_original_order() {
        let filter = parse_query_at("camera today roll", fixed_today());
        assert_eq!(filter.folder.as_deref(), Some("camera roll"));
    }

    #[test]
    fn test_non_numeric_days_is_a_folder() {
        let filter = parse_query_at("rainy days", fixed_today());
        assert_eq!(filter.date_range, None);
        assert_eq!(filter.folder.as_deref(), Some("rainy days"));
    }

    #[test]
    fn test_empty_query() {
        let filter = parse_query_at("   ", fixed_today());
        assert_eq!(filter, QueryFilter::default());
    }

    #[test]
    fn test_day_bounds_ordering() {
        let (start, end) = day_bounds(fixed_today());
        assert!(end > start);
        assert_eq!(end - start, 86_399);
    }
}
