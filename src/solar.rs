//! Extraterrestrial Radiation Module
//!
//! Top-of-atmosphere irradiance from orbital geometry, plus the few solar
//! angles needed to project it onto a horizontal surface.
//!
//! References:
//! - Spencer, J. W. (1971). "Fourier series representation of the position of the sun"
//! - Duffie, J. A. and Beckman, W. A. "Solar Engineering of Thermal Processes", ch. 1

use std::collections::BTreeMap;
use std::f64::consts::PI;

use chrono::{Month, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::time::{day_of_year, month_days};

// ===================== CONSTANTS =====================

/// Solar constant in W/m² (World Radiation Center value)
pub const SOLAR_CONSTANT: f64 = 1367.0;

const SECONDS_PER_HOUR: f64 = 3600.0;
const JOULES_PER_KWH: f64 = 3.6e6;

// ===================== ORBITAL GEOMETRY =====================

/// Day angle Γ in radians for day-of-year `n` (Spencer).
fn day_angle(day_of_year: u32) -> f64 {
    2.0 * PI * (day_of_year as f64 - 1.0) / 365.0
}

/// Calculate extraterrestrial irradiance corrected for Earth-Sun distance
///
/// Uses Spencer (1971) formula for orbital eccentricity correction
///
/// # Arguments
/// * `day_of_year` - Day of year (1-366)
///
/// # Returns
/// Extraterrestrial irradiance on a plane normal to the sun in W/m²
pub fn extraterrestrial_irradiance(day_of_year: u32) -> f64 {
    let b = day_angle(day_of_year);

    let eccentricity_correction = 1.000110
        + 0.034221 * b.cos()
        + 0.001280 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin();

    SOLAR_CONSTANT * eccentricity_correction
}

/// Solar declination in degrees (Spencer series)
pub fn declination_deg(day_of_year: u32) -> f64 {
    let b = day_angle(day_of_year);
    let rad = 0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin()
        - 0.006758 * (2.0 * b).cos()
        + 0.000907 * (2.0 * b).sin()
        - 0.002697 * (3.0 * b).cos()
        + 0.00148 * (3.0 * b).sin();
    rad.to_degrees()
}

/// Equation of time in minutes (apparent minus mean solar time)
pub fn equation_of_time_min(day_of_year: u32) -> f64 {
    let b = day_angle(day_of_year);
    229.18
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.040849 * (2.0 * b).sin())
}

/// Hour angle in degrees at local clock time `clock_hours`.
///
/// # Arguments
/// * `clock_hours` - Local clock time in hours (12.0 = noon)
/// * `longitude_deg` - Observer longitude, east positive
/// * `utc_offset_hours` - Offset of the local clock from UTC
/// * `day_of_year` - Day of year (1-366), for the equation of time
pub fn hour_angle_deg(
    clock_hours: f64,
    longitude_deg: f64,
    utc_offset_hours: f64,
    day_of_year: u32,
) -> f64 {
    let standard_meridian = 15.0 * utc_offset_hours;
    let correction_min =
        4.0 * (longitude_deg - standard_meridian) + equation_of_time_min(day_of_year);
    let solar_hours = clock_hours + correction_min / 60.0;
    15.0 * (solar_hours - 12.0)
}

/// Cosine of the solar zenith angle
pub fn cos_zenith(latitude_deg: f64, declination_deg: f64, hour_angle_deg: f64) -> f64 {
    let phi = latitude_deg.to_radians();
    let delta = declination_deg.to_radians();
    let omega = hour_angle_deg.to_radians();
    phi.sin() * delta.sin() + phi.cos() * delta.cos() * omega.cos()
}

/// Sunset hour angle in degrees; 0 during polar night, 180 during polar day
pub fn sunset_hour_angle_deg(latitude_deg: f64, declination_deg: f64) -> f64 {
    let x = -latitude_deg.to_radians().tan() * declination_deg.to_radians().tan();
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Extraterrestrial irradiation on a horizontal surface between two hour angles, in J/m²
///
/// # Arguments
/// * `g0n` - Normal-incidence extraterrestrial irradiance (W/m²)
/// * `omega1_deg`, `omega2_deg` - Start and end hour angles (degrees, `omega1 <= omega2`)
/// * `latitude_deg` - Observer latitude
/// * `declination_deg` - Solar declination
pub fn extraterrestrial_horizontal(
    g0n: f64,
    omega1_deg: f64,
    omega2_deg: f64,
    latitude_deg: f64,
    declination_deg: f64,
) -> f64 {
    let phi = latitude_deg.to_radians();
    let delta = declination_deg.to_radians();
    let w1 = omega1_deg.to_radians();
    let w2 = omega2_deg.to_radians();

    let a = 12.0 * SECONDS_PER_HOUR / PI;
    let c = (w2 - w1) * phi.sin() * delta.sin();
    let d = phi.cos() * delta.cos() * (w2.sin() - w1.sin());
    a * g0n * (c + d)
}

/// Daily extraterrestrial irradiation on a horizontal surface (sunrise to sunset), in kWh/m²
pub fn daily_extraterrestrial_horizontal_kwh(latitude_deg: f64, day_of_year: u32) -> f64 {
    let delta = declination_deg(day_of_year);
    let ws = sunset_hour_angle_deg(latitude_deg, delta);
    let g0n = extraterrestrial_irradiance(day_of_year);
    extraterrestrial_horizontal(g0n, -ws, ws, latitude_deg, delta).max(0.0) / JOULES_PER_KWH
}

/// Daily extraterrestrial irradiation at normal incidence over 24 h, in kWh/m²
pub fn daily_extraterrestrial_normal_kwh(day_of_year: u32) -> f64 {
    extraterrestrial_irradiance(day_of_year) * 24.0 / 1000.0
}

// ===================== MONTHLY ESTIMATOR =====================

/// Month → year-averaged monthly extraterrestrial irradiation (kWh/m²)
pub type ExtraterrestrialByMonth = BTreeMap<u32, f64>;

/// Inclusive range of calendar years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    pub fn count(&self) -> u32 {
        (self.end - self.start + 1) as u32
    }
}

/// Sum `daily(date)` over every day of each month in every year, then divide by the year count.
///
/// The result is a full month of daily values, averaged over years only.
fn monthly_year_average<F>(months: &[Month], years: YearRange, daily: F) -> ExtraterrestrialByMonth
where
    F: Fn(NaiveDate) -> f64,
{
    let mut totals = ExtraterrestrialByMonth::new();
    for &month in months {
        let mut sum = 0.0;
        for year in years.years() {
            sum += month_days(year, month).map(&daily).sum::<f64>();
        }
        let avg = sum / years.count() as f64;
        debug!(month = month.name(), kwh_m2 = avg, "extraterrestrial monthly total");
        totals.insert(month.number_from_month(), avg);
    }
    totals
}

/// Year-averaged monthly extraterrestrial irradiation at normal incidence.
///
/// Location independent: only the date enters through the Earth-Sun distance.
pub fn extraterrestrial_by_month(months: &[Month], years: YearRange) -> ExtraterrestrialByMonth {
    monthly_year_average(months, years, |date| daily_extraterrestrial_normal_kwh(day_of_year(date)))
}

/// Year-averaged monthly extraterrestrial irradiation on a horizontal surface at `latitude_deg`.
pub fn extraterrestrial_horizontal_by_month(
    months: &[Month],
    years: YearRange,
    latitude_deg: f64,
) -> ExtraterrestrialByMonth {
    monthly_year_average(months, years, |date| {
        daily_extraterrestrial_horizontal_kwh(latitude_deg, day_of_year(date))
    })
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WINTER_MONTHS;

    #[test]
    fn test_extraterrestrial_irradiance_range() {
        // Should vary by ~3.3% over the year
        let min = (1..=366).map(extraterrestrial_irradiance).fold(f64::INFINITY, f64::min);
        let max = (1..=366).map(extraterrestrial_irradiance).fold(f64::NEG_INFINITY, f64::max);

        // Perihelion (early January) should be highest
        let jan3 = extraterrestrial_irradiance(3);
        // Aphelion (early July) should be lowest
        let jul4 = extraterrestrial_irradiance(185);

        assert!(jan3 > jul4);
        assert!(min > 1315.0 && min < 1330.0, "min {min}");
        assert!(max > 1405.0 && max < 1420.0, "max {max}");

        let mean = (1..=365).map(extraterrestrial_irradiance).sum::<f64>() / 365.0;
        assert!((mean - SOLAR_CONSTANT).abs() < 2.0, "annual mean {mean}");
    }

    #[test]
    fn test_declination_extremes() {
        // Winter solstice ~ -23.4°, summer solstice ~ +23.4°, equinox ~ 0°
        assert!((declination_deg(355) + 23.4).abs() < 0.5);
        assert!((declination_deg(172) - 23.4).abs() < 0.5);
        assert!(declination_deg(80).abs() < 1.0);
    }

    #[test]
    fn test_equation_of_time_bounds() {
        // Early November peak ~ +16.4 min, mid February trough ~ -14.2 min
        assert!((equation_of_time_min(307) - 16.4).abs() < 0.6);
        assert!((equation_of_time_min(42) + 14.2).abs() < 0.6);
    }

    #[test]
    fn test_hour_angle_zero_at_solar_noon_on_meridian() {
        // On the standard meridian the only offset is the equation of time
        let doy = 105; // EoT ~ 0 mid April
        let ha = hour_angle_deg(12.0, 15.0, 1.0, doy);
        assert!(ha.abs() < 0.5, "hour angle {ha}");

        // 15° east of the meridian: solar noon one hour before clock noon
        let ha_east = hour_angle_deg(12.0, 30.0, 1.0, doy);
        assert!((ha_east - 15.0).abs() < 0.5, "hour angle {ha_east}");
    }

    #[test]
    fn test_cos_zenith_at_noon() {
        // At solar noon, zenith = |latitude - declination|
        let cz = cos_zenith(42.0, -23.44, 0.0);
        assert!((cz.acos().to_degrees() - 65.44).abs() < 1e-9);
    }

    #[test]
    fn test_sunset_hour_angle_polar_cases() {
        assert_eq!(sunset_hour_angle_deg(80.0, -23.0), 0.0);
        assert!((sunset_hour_angle_deg(80.0, 23.0) - 180.0).abs() < 1e-9);
        assert!((sunset_hour_angle_deg(0.0, 10.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_daily_horizontal_matches_textbook() {
        // Duffie & Beckman example 1.10.1: 43°N, April 15 -> H0 = 33.8 MJ/m²
        let h0_mj = daily_extraterrestrial_horizontal_kwh(43.0, 105) * 3.6;
        assert!((h0_mj - 33.8).abs() < 0.3, "H0 = {h0_mj} MJ/m²");
        assert_eq!(daily_extraterrestrial_horizontal_kwh(80.0, 355), 0.0);
    }

    #[test]
    fn test_hourly_integration_splits_the_day() {
        let doy = 20;
        let delta = declination_deg(doy);
        let g0n = extraterrestrial_irradiance(doy);
        let ws = sunset_hour_angle_deg(42.0, delta);
        let whole = extraterrestrial_horizontal(g0n, -ws, ws, 42.0, delta);
        let morning = extraterrestrial_horizontal(g0n, -ws, 0.0, 42.0, delta);
        let afternoon = extraterrestrial_horizontal(g0n, 0.0, ws, 42.0, delta);
        assert!((whole - morning - afternoon).abs() < 1e-6);
        assert!((morning - afternoon).abs() < 1e-6);
    }

    #[test]
    fn test_monthly_total_single_year_is_day_sum() {
        let years = YearRange::new(2015, 2015).unwrap();
        let totals = extraterrestrial_by_month(&WINTER_MONTHS, years);
        let jan: f64 = (1..=31).map(daily_extraterrestrial_normal_kwh).sum();
        assert_eq!(totals[&1], jan);
        assert_eq!(totals.len(), 4);
        // ~ 1.4 kW/m² * 24 h * 31 days
        assert!(totals[&12] > 1000.0 && totals[&12] < 1100.0, "dec {}", totals[&12]);
    }

    #[test]
    fn test_monthly_total_is_year_average() {
        let years = YearRange::new(2015, 2016).unwrap();
        let totals = extraterrestrial_by_month(&[Month::February], years);

        let feb2015: f64 = (32..=59).map(daily_extraterrestrial_normal_kwh).sum();
        let feb2016: f64 = (32..=60).map(daily_extraterrestrial_normal_kwh).sum();
        let expected = (feb2015 + feb2016) / 2.0;
        assert!((totals[&2] - expected).abs() < 1e-9);

        // Repeating the same year N times scales out exactly
        let one = extraterrestrial_by_month(&[Month::March], YearRange::new(2015, 2015).unwrap());
        let many = extraterrestrial_by_month(&[Month::March], YearRange::new(2013, 2015).unwrap());
        assert!((one[&3] - many[&3]).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_monthly_lower_than_normal() {
        let years = YearRange::new(2015, 2015).unwrap();
        let normal = extraterrestrial_by_month(&WINTER_MONTHS, years);
        let horizontal = extraterrestrial_horizontal_by_month(&WINTER_MONTHS, years, 42.0);
        for (m, h) in &horizontal {
            assert!(*h > 0.0 && *h < normal[m]);
        }
    }

    #[test]
    fn test_year_range_rejects_inverted() {
        assert!(YearRange::new(2016, 2015).is_err());
        assert_eq!(YearRange::new(2013, 2020).unwrap().count(), 8);
    }
}
