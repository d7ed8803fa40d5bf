//! Analysis Configuration Module
//!
//! Holds the immutable run configuration that is passed explicitly into
//! every pipeline stage.

use std::path::PathBuf;

use chrono::Month;

use crate::cli::Args;
use crate::dataset::Quantity;

// ===================== CONSTANTS =====================

/// Months analysed as "winter" (heating season for a winter house)
pub const WINTER_MONTHS: [Month; 4] =
    [Month::January, Month::February, Month::March, Month::December];

/// Default file name prefix of the PVGIS monthly exports
pub const DEFAULT_FILE_PREFIX: &str = "Monthlydata_42.000_12.215_SA2_2013_2020-";

/// Default numeric suffix range of the export files
pub const DEFAULT_ANGLE_FILES: (u32, u32) = (48, 71);

// ===================== POLICIES =====================

/// What to do with a winter month that has no monthly records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingMonthPolicy {
    /// Leave the month's average at zero and log a warning
    #[default]
    Zero,
    /// Abort the run
    Reject,
}

/// How the clearness index is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearnessMode {
    /// Tilted-plane ground irradiation over normal-incidence extraterrestrial irradiation
    #[default]
    Ratio,
    /// Day-by-day index from horizontal irradiation and the noon solar zenith angle.
    /// Known to give unreliable values; never the default.
    Zenith,
    /// Monthly K_T: horizontal irradiation over horizontal extraterrestrial irradiation
    Horizontal,
}

impl ClearnessMode {
    pub fn name(self) -> &'static str {
        match self {
            ClearnessMode::Ratio => "ratio",
            ClearnessMode::Zenith => "zenith",
            ClearnessMode::Horizontal => "horizontal",
        }
    }
}

// ===================== CONFIGURATION =====================

/// Complete configuration of one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Directory holding the dataset files
    pub data_dir: PathBuf,
    /// File name prefix; the numeric suffix and `.json` are appended
    pub file_prefix: String,
    /// Inclusive numeric suffix range of the dataset files
    pub angle_files: (u32, u32),
    /// Months included in the winter averages, in report order
    pub winter_months: Vec<Month>,
    /// Quantity maximised by the angle optimizer
    pub optimize_quantity: Quantity,
    pub missing_month_policy: MissingMonthPolicy,
    pub clearness_mode: ClearnessMode,
    /// Timezone option used to find the standard meridian in zenith mode
    pub timezone: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            angle_files: DEFAULT_ANGLE_FILES,
            winter_months: WINTER_MONTHS.to_vec(),
            optimize_quantity: Quantity::TiltedGlobal,
            missing_month_policy: MissingMonthPolicy::Zero,
            clearness_mode: ClearnessMode::Ratio,
            timezone: "location".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_args(args: &Args) -> Self {
        let clearness_mode = match args.clearness_mode.as_str() {
            "zenith" => ClearnessMode::Zenith,
            "horizontal" => ClearnessMode::Horizontal,
            _ => ClearnessMode::Ratio,
        };
        let missing_month_policy =
            if args.strict { MissingMonthPolicy::Reject } else { MissingMonthPolicy::Zero };

        Self {
            data_dir: args.data_dir.clone(),
            file_prefix: args.file_prefix.clone(),
            angle_files: args.angle_range,
            missing_month_policy,
            clearness_mode,
            timezone: args.timezone.clone(),
            ..Self::default()
        }
    }

    /// Number of winter months, the divisor of the winter-period mean
    pub fn winter_month_count(&self) -> usize {
        self.winter_months.len()
    }

    pub fn is_winter_month(&self, month: Month) -> bool {
        self.winter_months.contains(&month)
    }
}
