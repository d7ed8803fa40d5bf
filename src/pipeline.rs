//! Analysis Pipeline
//!
//! Runs loader → averager → optimizer → extraterrestrial estimator →
//! clearness index in one linear pass and collects everything the report needs.

use chrono::Month;
use serde::Serialize;
use tracing::info;

use crate::averaging::{AveragedAngleData, average_winter_months, serialize_month};
use crate::clearness::{self, ClearnessIndexByMonth, Site};
use crate::config::{AnalysisConfig, ClearnessMode};
use crate::dataset::{self, IrradianceDataset};
use crate::error::{Error, Result};
use crate::optimize::{OptimalAngle, TotalByAngle, calculate_optimal_angle};
use crate::solar::{self, ExtraterrestrialByMonth, YearRange};
use crate::time::timezone_for;

/// Extraterrestrial irradiation of one month (kWh/m², year-averaged monthly total)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyExtraterrestrial {
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub kwh_m2: f64,
}

/// Everything printed at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub latitude: f64,
    pub longitude: f64,
    pub year_min: i32,
    pub year_max: i32,
    pub dataset_count: usize,
    /// Quantity the tilt was optimized for
    pub quantity: &'static str,
    pub optimal: OptimalAngle,
    pub extraterrestrial: Vec<MonthlyExtraterrestrial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraterrestrial_horizontal: Option<Vec<MonthlyExtraterrestrial>>,
    pub clearness_mode: &'static str,
    pub clearness_index: ClearnessIndexByMonth,
}

/// Intermediate tables plus the final report
#[derive(Debug, Clone)]
pub struct Analysis {
    pub averaged: AveragedAngleData,
    pub totals: TotalByAngle,
    pub report: AnalysisReport,
}

fn in_month_order(config: &AnalysisConfig, by_month: &ExtraterrestrialByMonth) -> Vec<MonthlyExtraterrestrial> {
    config
        .winter_months
        .iter()
        .filter_map(|&month| {
            by_month
                .get(&month.number_from_month())
                .map(|&kwh_m2| MonthlyExtraterrestrial { month, kwh_m2 })
        })
        .collect()
}

/// Load the configured dataset files and analyse them.
pub fn run(config: &AnalysisConfig) -> Result<Analysis> {
    let datasets = dataset::load_datasets(config)?;
    analyze(&datasets, config)
}

/// Analyse already-loaded datasets.
pub fn analyze(datasets: &[IrradianceDataset], config: &AnalysisConfig) -> Result<Analysis> {
    if datasets.is_empty() {
        return Err(Error::NoDatasets);
    }

    let averaged = average_winter_months(datasets, config)?;
    let (totals, optimal) = calculate_optimal_angle(&averaged, config);
    let optimal = optimal
        .ok_or(Error::NoPositiveCandidate { quantity: config.optimize_quantity.key() })?;

    // Location and year span come from the dataset of the chosen angle
    let chosen = datasets
        .iter()
        .find(|d| d.angle == optimal.angle)
        .ok_or(Error::NoDatasets)?;
    let years = YearRange::new(chosen.year_min, chosen.year_max)?;

    let extraterrestrial = solar::extraterrestrial_by_month(&config.winter_months, years);
    let at_optimum = &averaged[&optimal.angle];

    let mut extraterrestrial_horizontal = None;
    let clearness_index = match config.clearness_mode {
        ClearnessMode::Ratio => clearness::clearness_index(at_optimum, &extraterrestrial)?,
        ClearnessMode::Horizontal => {
            let h0 = solar::extraterrestrial_horizontal_by_month(
                &config.winter_months,
                years,
                chosen.latitude,
            );
            let kt = clearness::horizontal_clearness_index(at_optimum, &h0)?;
            extraterrestrial_horizontal = Some(in_month_order(config, &h0));
            kt
        }
        ClearnessMode::Zenith => {
            let site = Site {
                latitude: chosen.latitude,
                longitude: chosen.longitude,
                timezone: timezone_for(&config.timezone, chosen.longitude, chosen.latitude),
            };
            info!(timezone = %site.timezone, "resolved timezone for zenith correction");
            clearness::zenith_clearness_index(at_optimum, years, site)?
        }
    };

    let report = AnalysisReport {
        latitude: chosen.latitude,
        longitude: chosen.longitude,
        year_min: years.start,
        year_max: years.end,
        dataset_count: datasets.len(),
        quantity: config.optimize_quantity.key(),
        optimal,
        extraterrestrial: in_month_order(config, &extraterrestrial),
        extraterrestrial_horizontal,
        clearness_mode: config.clearness_mode.name(),
        clearness_index,
    };

    Ok(Analysis { averaged, totals, report })
}

// ===================== TESTS =====================
