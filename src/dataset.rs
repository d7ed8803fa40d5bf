//! Dataset Loading Module
//!
//! Reads PVGIS monthly-radiation JSON exports, one file per fixed tilt angle,
//! and turns them into validated [`IrradianceDataset`] records.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};

// ===================== QUANTITIES =====================

/// Monthly irradiation quantities reported by PVGIS (kWh/m² per month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// `H(h)_m`: global irradiation on the horizontal plane
    GlobalHorizontal,
    /// `H(i)_m`: global irradiation on the inclined plane
    TiltedGlobal,
    /// `Hb(n)_m`: direct (beam) irradiation on a plane always normal to the sun
    BeamNormal,
}

impl Quantity {
    pub const ALL: [Quantity; 3] =
        [Quantity::GlobalHorizontal, Quantity::TiltedGlobal, Quantity::BeamNormal];

    /// Field name used in the PVGIS JSON output
    pub fn key(self) -> &'static str {
        match self {
            Quantity::GlobalHorizontal => "H(h)_m",
            Quantity::TiltedGlobal => "H(i)_m",
            Quantity::BeamNormal => "Hb(n)_m",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One value per [`Quantity`], stored in a fixed-size array
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuantityValues([f64; 3]);

impl QuantityValues {
    pub fn new(global_horizontal: f64, tilted_global: f64, beam_normal: f64) -> Self {
        Self([global_horizontal, tilted_global, beam_normal])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Quantity, f64)> + '_ {
        Quantity::ALL.iter().map(move |&q| (q, self[q]))
    }

    pub fn add_assign(&mut self, other: &QuantityValues) {
        for q in Quantity::ALL {
            self[q] += other[q];
        }
    }

    pub fn scale(&mut self, divisor: f64) {
        for v in &mut self.0 {
            *v /= divisor;
        }
    }
}

impl Index<Quantity> for QuantityValues {
    type Output = f64;

    fn index(&self, q: Quantity) -> &f64 {
        &self.0[q.index()]
    }
}

impl IndexMut<Quantity> for QuantityValues {
    fn index_mut(&mut self, q: Quantity) -> &mut f64 {
        &mut self.0[q.index()]
    }
}

impl Serialize for QuantityValues {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Quantity::ALL.len()))?;
        for (q, v) in self.iter() {
            map.serialize_entry(q.key(), &v)?;
        }
        map.end()
    }
}

// ===================== TILT ANGLE =====================

/// Panel tilt from horizontal in degrees, totally ordered so it can key a `BTreeMap`
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct TiltAngle(pub f64);

impl TiltAngle {
    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl PartialEq for TiltAngle {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TiltAngle {}

impl PartialOrd for TiltAngle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TiltAngle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for TiltAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ===================== DATASET RECORDS =====================

/// One monthly row of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRecord {
    /// Calendar year of the row, when the provider reports it
    pub year: Option<i32>,
    /// Month number (1-12)
    pub month: u32,
    pub values: QuantityValues,
}

/// All monthly data for a single fixed tilt angle
#[derive(Debug, Clone, PartialEq)]
pub struct IrradianceDataset {
    pub angle: TiltAngle,
    pub year_min: i32,
    pub year_max: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub monthly: Vec<MonthlyRecord>,
}

impl IrradianceDataset {
    /// Number of years covered by the dataset (inclusive range)
    pub fn year_count(&self) -> u32 {
        (self.year_max - self.year_min + 1) as u32
    }
}

// ===================== PVGIS JSON LAYOUT =====================

#[derive(Debug, Deserialize)]
struct RawDataset {
    inputs: RawInputs,
    outputs: RawOutputs,
}

#[derive(Debug, Deserialize)]
struct RawInputs {
    location: RawLocation,
    meteo_data: RawMeteoData,
    plane: RawPlane,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct RawMeteoData {
    year_min: i32,
    year_max: i32,
}

#[derive(Debug, Deserialize)]
struct RawPlane {
    fixed_inclined: RawFixedInclined,
}

#[derive(Debug, Deserialize)]
struct RawFixedInclined {
    slope: RawSlope,
}

#[derive(Debug, Deserialize)]
struct RawSlope {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct RawOutputs {
    monthly: Vec<RawMonthly>,
}

#[derive(Debug, Deserialize)]
struct RawMonthly {
    #[serde(default)]
    year: Option<i32>,
    month: u32,
    #[serde(rename = "H(h)_m")]
    global_horizontal: f64,
    #[serde(rename = "H(i)_m")]
    tilted_global: f64,
    #[serde(rename = "Hb(n)_m")]
    beam_normal: f64,
}

/// Parse and validate a single PVGIS document.
///
/// `path` is only used for error reporting.
pub fn parse_dataset(json: &str, path: &Path) -> Result<IrradianceDataset> {
    let raw: RawDataset = serde_json::from_str(json)
        .map_err(|source| Error::Parse { path: path.to_path_buf(), source })?;

    let invalid = |reason: String| Error::InvalidDataset { path: path.to_path_buf(), reason };

    let meteo = &raw.inputs.meteo_data;
    if meteo.year_max < meteo.year_min {
        return Err(invalid(format!(
            "year_max ({}) is before year_min ({})",
            meteo.year_max, meteo.year_min
        )));
    }

    let slope = raw.inputs.plane.fixed_inclined.slope.value;
    if !slope.is_finite() {
        return Err(invalid(format!("non-finite slope {}", slope)));
    }

    let mut monthly = Vec::with_capacity(raw.outputs.monthly.len());
    for row in raw.outputs.monthly {
        if !(1..=12).contains(&row.month) {
            return Err(invalid(format!("month {} out of range 1-12", row.month)));
        }
        if let Some(year) = row.year
            && !(meteo.year_min..=meteo.year_max).contains(&year)
        {
            return Err(invalid(format!(
                "row year {} outside {}-{}",
                year, meteo.year_min, meteo.year_max
            )));
        }
        let values = QuantityValues::new(row.global_horizontal, row.tilted_global, row.beam_normal);
        if let Some((q, v)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("non-finite {} = {} in month {}", q, v, row.month)));
        }
        monthly.push(MonthlyRecord { year: row.year, month: row.month, values });
    }

    Ok(IrradianceDataset {
        angle: TiltAngle(slope),
        year_min: meteo.year_min,
        year_max: meteo.year_max,
        latitude: raw.inputs.location.latitude,
        longitude: raw.inputs.location.longitude,
        monthly,
    })
}

/// Path of the dataset file carrying numeric suffix `n`
pub fn dataset_path(config: &AnalysisConfig, n: u32) -> PathBuf {
    config.data_dir.join(format!("{}{}.json", config.file_prefix, n))
}

/// Load every dataset file in the configured numeric range.
///
/// Files are read in suffix order. The angle key is the slope embedded in
/// each document, never the file suffix.
pub fn load_datasets(config: &AnalysisConfig) -> Result<Vec<IrradianceDataset>> {
    let (start, end) = config.angle_files;
    if start > end {
        return Err(Error::EmptyAngleRange { start, end });
    }

    let mut datasets: Vec<(PathBuf, IrradianceDataset)> = Vec::new();
    for n in start..=end {
        let path = dataset_path(config, n);
        let json = std::fs::read_to_string(&path)
            .map_err(|source| Error::Io { path: path.clone(), source })?;
        let dataset = parse_dataset(&json, &path)?;
        debug!(
            path = %path.display(),
            angle = %dataset.angle,
            years = %format!("{}-{}", dataset.year_min, dataset.year_max),
            records = dataset.monthly.len(),
            "loaded dataset"
        );

        if let Some((first, _)) = datasets.iter().find(|(_, d)| d.angle == dataset.angle) {
            return Err(Error::DuplicateAngle {
                angle: dataset.angle,
                first: first.clone(),
                second: path,
            });
        }
        datasets.push((path, dataset));
    }

    let datasets: Vec<IrradianceDataset> = datasets.into_iter().map(|(_, d)| d).collect();
    if let (Some(lo), Some(hi)) =
        (datasets.iter().map(|d| d.angle).min(), datasets.iter().map(|d| d.angle).max())
    {
        info!(count = datasets.len(), "loaded datasets for tilt {}°-{}°", lo, hi);
    }
    Ok(datasets)
}

// ===================== TESTS =====================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a PVGIS-shaped document with the given winter rows
    pub(crate) fn pvgis_json(
        angle: f64,
        year_min: i32,
        year_max: i32,
        rows: &[(i32, u32, f64, f64, f64)],
    ) -> String {
        let monthly: Vec<serde_json::Value> = rows
            .iter()
            .map(|&(year, month, hh, hi, hb)| {
                serde_json::json!({
                    "year": year,
                    "month": month,
                    "H(h)_m": hh,
                    "H(i)_m": hi,
                    "Hb(n)_m": hb,
                    "T2m": 8.1
                })
            })
            .collect();
        serde_json::json!({
            "inputs": {
                "location": { "latitude": 42.0, "longitude": 12.215, "elevation": 190.0 },
                "meteo_data": { "radiation_db": "PVGIS-SARAH2", "year_min": year_min, "year_max": year_max },
                "plane": { "fixed_inclined": { "slope": { "value": angle, "optimal": false } } }
            },
            "outputs": { "monthly": monthly },
            "meta": {}
        })
        .to_string()
    }

    #[test]
    fn test_parse_dataset_reads_nested_fields() {
        let json = pvgis_json(48.0, 2013, 2020, &[(2013, 1, 60.5, 110.2, 95.0)]);
        let ds = parse_dataset(&json, Path::new("a.json")).unwrap();

        assert_eq!(ds.angle, TiltAngle(48.0));
        assert_eq!(ds.year_min, 2013);
        assert_eq!(ds.year_max, 2020);
        assert_eq!(ds.year_count(), 8);
        assert!((ds.latitude - 42.0).abs() < 1e-12);
        assert!((ds.longitude - 12.215).abs() < 1e-12);
        assert_eq!(ds.monthly.len(), 1);
        assert_eq!(ds.monthly[0].year, Some(2013));
        assert_eq!(ds.monthly[0].values[Quantity::TiltedGlobal], 110.2);
        assert_eq!(ds.monthly[0].values[Quantity::GlobalHorizontal], 60.5);
        assert_eq!(ds.monthly[0].values[Quantity::BeamNormal], 95.0);
    }

    #[test]
    fn test_parse_dataset_missing_field_is_fatal() {
        let json = r#"{"inputs": {"location": {"latitude": 1.0, "longitude": 2.0},
            "meteo_data": {"year_min": 2015, "year_max": 2016}},
            "outputs": {"monthly": []}}"#;
        let err = parse_dataset(json, Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "unexpected error: {err}");
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_parse_dataset_rejects_inverted_years() {
        let json = pvgis_json(30.0, 2020, 2013, &[]);
        let err = parse_dataset(&json, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, Error::InvalidDataset { .. }));
    }

    #[test]
    fn test_parse_dataset_rejects_bad_month() {
        let json = pvgis_json(30.0, 2015, 2015, &[(2015, 13, 1.0, 1.0, 1.0)]);
        let err = parse_dataset(&json, Path::new("x.json")).unwrap_err();
        assert!(err.to_string().contains("month 13"));
    }

    #[test]
    fn test_parse_dataset_rejects_row_outside_year_range() {
        let json = pvgis_json(30.0, 2015, 2016, &[(2019, 1, 1.0, 1.0, 1.0)]);
        let err = parse_dataset(&json, Path::new("x.json")).unwrap_err();
        assert!(err.to_string().contains("row year 2019"));
    }

    #[test]
    fn test_tilt_angle_ordering_and_display() {
        let mut angles = vec![TiltAngle(40.0), TiltAngle(30.0), TiltAngle(35.5)];
        angles.sort();
        assert_eq!(angles, vec![TiltAngle(30.0), TiltAngle(35.5), TiltAngle(40.0)]);
        assert_eq!(TiltAngle(48.0).to_string(), "48");
        assert_eq!(TiltAngle(35.5).to_string(), "35.5");
    }

    #[test]
    fn test_load_datasets_reads_range_and_detects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            data_dir: dir.path().to_path_buf(),
            file_prefix: "Monthly-".to_string(),
            angle_files: (1, 2),
            ..AnalysisConfig::default()
        };
        std::fs::write(dir.path().join("Monthly-1.json"), pvgis_json(30.0, 2015, 2016, &[]))
            .unwrap();
        std::fs::write(dir.path().join("Monthly-2.json"), pvgis_json(35.0, 2015, 2016, &[]))
            .unwrap();

        let datasets = load_datasets(&config).unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[1].angle, TiltAngle(35.0));

        std::fs::write(dir.path().join("Monthly-2.json"), pvgis_json(30.0, 2015, 2016, &[]))
            .unwrap();
        let err = load_datasets(&config).unwrap_err();
        assert!(matches!(err, Error::DuplicateAngle { .. }));
    }

    #[test]
    fn test_load_datasets_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            data_dir: dir.path().to_path_buf(),
            file_prefix: "none-".to_string(),
            angle_files: (5, 5),
            ..AnalysisConfig::default()
        };
        let err = load_datasets(&config).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("none-5.json"));
    }

    #[test]
    fn test_load_datasets_empty_range() {
        let config = AnalysisConfig { angle_files: (10, 3), ..AnalysisConfig::default() };
        assert!(matches!(load_datasets(&config), Err(Error::EmptyAngleRange { start: 10, end: 3 })));
    }
}
