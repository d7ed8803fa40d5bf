//! Monthly Averaging Module
//!
//! Collapses each dataset's multi-year monthly rows into one per-year
//! average for every winter month.

use std::collections::BTreeMap;

use chrono::Month;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{AnalysisConfig, MissingMonthPolicy};
use crate::dataset::{IrradianceDataset, QuantityValues, TiltAngle};
use crate::error::{Error, Result};
use crate::time::month_from_number;

/// Per-year average of each quantity for one winter month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthAverage {
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub values: QuantityValues,
}

/// Winter-month averages for a single tilt angle, in configured month order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AngleAverages {
    pub months: Vec<MonthAverage>,
}

impl AngleAverages {
    pub fn get(&self, month: Month) -> Option<&QuantityValues> {
        self.months.iter().find(|m| m.month == month).map(|m| &m.values)
    }
}

/// Tilt angle → winter month → quantity → per-year average
pub type AveragedAngleData = BTreeMap<TiltAngle, AngleAverages>;

pub(crate) fn serialize_month<S: serde::Serializer>(
    month: &Month,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(month.name())
}

/// Average every dataset's winter months over its year span.
///
/// Rows of the same month are summed across years and the sum is divided by
/// `year_max - year_min + 1`. A winter month with no rows stays at zero under
/// [`MissingMonthPolicy::Zero`]; the value is then an underestimate, not a
/// skipped month.
pub fn average_winter_months(
    datasets: &[IrradianceDataset],
    config: &AnalysisConfig,
) -> Result<AveragedAngleData> {
    let mut averaged = AveragedAngleData::new();

    for dataset in datasets {
        let mut sums: Vec<(Month, QuantityValues, usize)> = config
            .winter_months
            .iter()
            .map(|&m| (m, QuantityValues::default(), 0))
            .collect();

        for record in &dataset.monthly {
            let Some(month) = month_from_number(record.month) else { continue };
            if !config.is_winter_month(month) {
                continue;
            }
            if let Some((_, acc, rows)) = sums.iter_mut().find(|(m, _, _)| *m == month) {
                acc.add_assign(&record.values);
                *rows += 1;
            }
        }

        let year_count = dataset.year_count() as f64;
        let mut months = Vec::with_capacity(sums.len());
        for (month, mut values, rows) in sums {
            if rows == 0 {
                match config.missing_month_policy {
                    MissingMonthPolicy::Reject => {
                        return Err(Error::MissingMonth { angle: dataset.angle, month: month.name() });
                    }
                    MissingMonthPolicy::Zero => {
                        warn!(angle = %dataset.angle, month = month.name(), "no records, averaging as zero");
                    }
                }
            }
            values.scale(year_count);
            months.push(MonthAverage { month, values });
        }

        debug!(angle = %dataset.angle, years = year_count, "averaged winter months");
        averaged.insert(dataset.angle, AngleAverages { months });
    }

    Ok(averaged)
}

// ===================== TESTS =====================
