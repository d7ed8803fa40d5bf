//! Winter Tilt Optimization
//!
//! Reduces per-month averages to one winter-period mean per tilt angle and
//! picks the angle with the highest mean of the optimized quantity.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::averaging::AveragedAngleData;
use crate::config::AnalysisConfig;
use crate::dataset::{Quantity, QuantityValues, TiltAngle};

/// Tilt angle → quantity → mean over the winter months
pub type TotalByAngle = BTreeMap<TiltAngle, QuantityValues>;

/// Best tilt angle found by [`select_optimal_angle`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalAngle {
    pub angle: TiltAngle,
    /// Winter-period mean of the optimized quantity (kWh/m² per month)
    pub value: f64,
}

/// Mean of each quantity over the configured winter months, per angle.
pub fn winter_totals(averaged: &AveragedAngleData, config: &AnalysisConfig) -> TotalByAngle {
    let month_count = config.winter_month_count() as f64;
    averaged
        .iter()
        .map(|(&angle, averages)| {
            let mut total = QuantityValues::default();
            for month in &averages.months {
                total.add_assign(&month.values);
            }
            total.scale(month_count);
            (angle, total)
        })
        .collect()
}

/// Pick the angle with the strictly greatest value of `quantity`.
///
/// Angles are scanned in ascending order and only a strictly greater value
/// replaces the current best, so the smallest of several tied angles wins.
/// The scan starts from zero: `None` means no angle had a positive value.
pub fn select_optimal_angle(totals: &TotalByAngle, quantity: Quantity) -> Option<OptimalAngle> {
    let mut best: Option<OptimalAngle> = None;
    let mut best_value = 0.0;

    for (&angle, values) in totals {
        let v = values[quantity];
        debug!(angle = %angle, value = v, "winter mean of {}", quantity);
        if v > best_value {
            best_value = v;
            best = Some(OptimalAngle { angle, value: v });
        }
    }

    if let Some(opt) = best {
        info!(angle = %opt.angle, value = opt.value, "optimal winter tilt");
    }
    best
}

/// Winter totals and the optimum in one call
pub fn calculate_optimal_angle(
    averaged: &AveragedAngleData,
    config: &AnalysisConfig,
) -> (TotalByAngle, Option<OptimalAngle>) {
    let totals = winter_totals(averaged, config);
    let optimum = select_optimal_angle(&totals, config.optimize_quantity);
    (totals, optimum)
}
