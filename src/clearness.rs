//! Clearness Index Module
//!
//! Compares ground-level irradiation with extraterrestrial irradiation to
//! measure atmospheric attenuation per winter month.

use chrono::Month;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::averaging::{AngleAverages, serialize_month};
use crate::dataset::Quantity;
use crate::error::{Error, Result};
use crate::solar::{
    self, ExtraterrestrialByMonth, YearRange, cos_zenith, declination_deg, hour_angle_deg,
};
use crate::time::{day_of_year, days_in_month, month_days, utc_offset_hours_at_noon};

/// Clearness index of one winter month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyClearness {
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub index: f64,
}

/// Month → clearness index, in configured month order
pub type ClearnessIndexByMonth = Vec<MonthlyClearness>;

/// Divide one quantity of the monthly averages by a per-month reference.
///
/// A zero or non-finite reference is an error rather than an infinite index.
pub fn ratio_by_month(
    averages: &AngleAverages,
    quantity: Quantity,
    reference: &ExtraterrestrialByMonth,
) -> Result<ClearnessIndexByMonth> {
    averages
        .months
        .iter()
        .map(|m| {
            let denominator = reference.get(&m.month.number_from_month()).copied().unwrap_or(0.0);
            if denominator == 0.0 || !denominator.is_finite() {
                return Err(Error::ZeroExtraterrestrial { month: m.month.name() });
            }
            let index = m.values[quantity] / denominator;
            debug!(month = m.month.name(), index, "clearness index");
            Ok(MonthlyClearness { month: m.month, index })
        })
        .collect()
}

/// Clearness index as tilted-plane irradiation over normal-incidence extraterrestrial irradiation.
///
/// `averages` are the winter averages at the optimal angle.
pub fn clearness_index(
    averages: &AngleAverages,
    extraterrestrial: &ExtraterrestrialByMonth,
) -> Result<ClearnessIndexByMonth> {
    ratio_by_month(averages, Quantity::TiltedGlobal, extraterrestrial)
}

/// Monthly K_T: horizontal irradiation over horizontal extraterrestrial irradiation.
pub fn horizontal_clearness_index(
    averages: &AngleAverages,
    extraterrestrial_horizontal: &ExtraterrestrialByMonth,
) -> Result<ClearnessIndexByMonth> {
    ratio_by_month(averages, Quantity::GlobalHorizontal, extraterrestrial_horizontal)
}

/// Location of the site for the zenith correction
#[derive(Debug, Clone, Copy)]
pub struct Site {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Tz,
}

/// Day-by-day clearness index corrected by the solar zenith angle at local clock noon.
///
/// For every day the month's horizontal irradiation is spread evenly over
/// its days and divided by the normal-incidence extraterrestrial energy
/// projected with `cos θz` at noon; the daily indices are then averaged over
/// all days and years. The noon projection overstates the daily horizontal
/// extraterrestrial energy, so the resulting values are not trustworthy.
pub fn zenith_clearness_index(
    averages: &AngleAverages,
    years: YearRange,
    site: Site,
) -> Result<ClearnessIndexByMonth> {
    warn!("zenith-corrected clearness index is experimental and known to be unreliable");

    let mut result = Vec::with_capacity(averages.months.len());
    for m in &averages.months {
        let mut sum = 0.0;
        let mut used_days = 0u32;

        for year in years.years() {
            let daily_ground = m.values[Quantity::GlobalHorizontal] / days_in_month(year, m.month) as f64;

            for date in month_days(year, m.month) {
                let doy = day_of_year(date);
                let offset = utc_offset_hours_at_noon(site.timezone, date);
                let omega = hour_angle_deg(12.0, site.longitude, offset, doy);
                let cz = cos_zenith(site.latitude, declination_deg(doy), omega);
                if cz <= 0.0 {
                    debug!(%date, "sun below horizon at local noon, day skipped");
                    continue;
                }
                let reference = solar::daily_extraterrestrial_normal_kwh(doy) * cz;
                sum += daily_ground / reference;
                used_days += 1;
            }
        }

        if used_days == 0 {
            return Err(Error::NoDaylight { month: m.month.name(), latitude: site.latitude });
        }
        let index = sum / used_days as f64;
        info!(month = m.month.name(), index, days = used_days, "zenith-corrected clearness index");
        result.push(MonthlyClearness { month: m.month, index });
    }
    Ok(result)
}

// ===================== TESTS =====================
