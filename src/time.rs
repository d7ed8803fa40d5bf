//! Calendar and Timezone Utilities Module
//!
//! Provides month/day-of-year arithmetic and timezone resolution used to
//! place local clock noon on the solar time scale.

use chrono::{Datelike, Month, NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use std::sync::OnceLock;
use tzf_rs::DefaultFinder;

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

// ===================== CALENDAR =====================

/// Map a month number (1-12) to a [`Month`].
pub fn month_from_number(n: u32) -> Option<Month> {
    let month = match n {
        1 => Month::January,
        2 => Month::February,
        3 => Month::March,
        4 => Month::April,
        5 => Month::May,
        6 => Month::June,
        7 => Month::July,
        8 => Month::August,
        9 => Month::September,
        10 => Month::October,
        11 => Month::November,
        12 => Month::December,
        _ => return None,
    };
    Some(month)
}

/// Iterate over every date of `month` in `year`.
///
/// Leap years are honoured, so February yields 29 dates in 2016.
pub fn month_days(year: i32, month: Month) -> impl Iterator<Item = NaiveDate> {
    let m = month.number_from_month();
    (1..=31).map_while(move |d| NaiveDate::from_ymd_opt(year, m, d))
}

/// Number of days of `month` in `year`.
pub fn days_in_month(year: i32, month: Month) -> u32 {
    month_days(year, month).count() as u32
}

/// Position of a month on the December-to-March plot axis (December = 0).
pub fn season_position(month: Month) -> u32 {
    month.number_from_month() % 12
}

// ===================== TIMEZONE UTILITIES =====================

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    get_timezone().ok().and_then(|s| s.parse().ok()).unwrap_or(Tz::UTC)
}

/// Resolve timezone from geographic coordinates.
///
/// # Arguments
/// * `lon` - Longitude in degrees
/// * `lat` - Latitude in degrees
///
/// # Returns
/// The resolved timezone, or UTC if resolution fails
pub fn resolve_timezone(lon: f64, lat: f64) -> Tz {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);

    // Get the IANA string (e.g., "Europe/Rome")
    let tzid = finder.get_tz_name(lon, lat);

    tzid.parse::<Tz>().unwrap_or(Tz::UTC)
}

/// Resolve the `--timezone` option ("location", "system", "utc" or an IANA name).
pub fn timezone_for(option: &str, lon: f64, lat: f64) -> Tz {
    match option {
        "location" => resolve_timezone(lon, lat),
        "system" => system_timezone(),
        "utc" | "UTC" => Tz::UTC,
        other => other.parse().unwrap_or(Tz::UTC),
    }
}

/// UTC offset of local clock noon on `date`, in hours.
///
/// DST is included: the offset is the one the wall clock actually uses that day.
pub fn utc_offset_hours_at_noon(tz: Tz, date: NaiveDate) -> f64 {
    let noon = date.and_hms_opt(12, 0, 0).expect("12:00:00 is a valid time");
    match tz.from_local_datetime(&noon).earliest() {
        Some(t) => t.offset().fix().local_minus_utc() as f64 / 3600.0,
        // Noon skipped by a transition; use the offset in force at that UTC instant
        None => {
            let utc = tz.from_utc_datetime(&noon);
            utc.offset().fix().local_minus_utc() as f64 / 3600.0
        }
    }
}

/// Day of year (1-366) of `date`.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_lengths_honour_leap_years() {
        assert_eq!(days_in_month(2016, Month::February), 29);
        assert_eq!(days_in_month(2015, Month::February), 28);
        assert_eq!(days_in_month(2000, Month::February), 29);
        assert_eq!(days_in_month(1900, Month::February), 28);
        assert_eq!(days_in_month(2015, Month::December), 31);
        assert_eq!(days_in_month(2015, Month::April), 30);
    }

    #[test]
    fn test_month_from_number_bounds() {
        assert_eq!(month_from_number(1), Some(Month::January));
        assert_eq!(month_from_number(12), Some(Month::December));
        assert_eq!(month_from_number(0), None);
        assert_eq!(month_from_number(13), None);
    }

    #[test]
    fn test_season_position_starts_at_december() {
        assert_eq!(season_position(Month::December), 0);
        assert_eq!(season_position(Month::January), 1);
        assert_eq!(season_position(Month::February), 2);
        assert_eq!(season_position(Month::March), 3);
    }

    #[test]
    fn test_day_of_year() {
        let d = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        assert_eq!(day_of_year(d), 61);
        let d = NaiveDate::from_ymd_opt(2015, 12, 31).unwrap();
        assert_eq!(day_of_year(d), 365);
    }

    #[test]
    fn test_utc_offset_includes_dst() {
        let rome: Tz = "Europe/Rome".parse().unwrap();
        let winter = NaiveDate::from_ymd_opt(2016, 1, 15).unwrap();
        let summer = NaiveDate::from_ymd_opt(2016, 7, 15).unwrap();
        assert_eq!(utc_offset_hours_at_noon(rome, winter), 1.0);
        assert_eq!(utc_offset_hours_at_noon(rome, summer), 2.0);
        assert_eq!(utc_offset_hours_at_noon(Tz::UTC, winter), 0.0);
    }

    #[test]
    fn test_timezone_option_parsing() {
        assert_eq!(timezone_for("utc", 12.2, 42.0), Tz::UTC);
        assert_eq!(timezone_for("Europe/Rome", 0.0, 0.0), chrono_tz::Europe::Rome);
        assert_eq!(timezone_for("Not/AZone", 0.0, 0.0), Tz::UTC);
    }
}
