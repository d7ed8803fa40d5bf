//! Plot Data Export
//!
//! Emits the scatter series an external plotting tool draws: irradiation per
//! (winter month, tilt angle) in 3D and the winter mean per tilt angle in 2D.
//! Export is observational only; nothing flows back into the analysis.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::averaging::AveragedAngleData;
use crate::dataset::Quantity;
use crate::error::{Error, Result};
use crate::optimize::TotalByAngle;
use crate::time::season_position;

/// Receiver of scatter series
pub trait PlotSink {
    /// (month position, tilt angle, value) points; December is position 0
    fn scatter_3d(&mut self, axis_labels: [&str; 3], points: &[(f64, f64, f64)]);

    /// (tilt angle, value) points
    fn scatter_2d(&mut self, axis_labels: [&str; 2], points: &[(f64, f64)]);
}

/// Send both scatter series for `quantity` to `sink`.
pub fn emit_scatter(
    sink: &mut dyn PlotSink,
    averaged: &AveragedAngleData,
    totals: &TotalByAngle,
    quantity: Quantity,
) {
    let value_label = format!("{} (kWh/m^2)", quantity);

    let points_3d: Vec<(f64, f64, f64)> = averaged
        .iter()
        .flat_map(|(angle, averages)| {
            averages.months.iter().map(move |m| {
                (season_position(m.month) as f64, angle.degrees(), m.values[quantity])
            })
        })
        .collect();
    sink.scatter_3d(["December -> March", "Tilt Angle", value_label.as_str()], &points_3d);

    let points_2d: Vec<(f64, f64)> =
        totals.iter().map(|(angle, values)| (angle.degrees(), values[quantity])).collect();
    sink.scatter_2d(["Tilt Angle", value_label.as_str()], &points_2d);
}

#[derive(Debug, Default, Serialize)]
struct Series<P> {
    axes: Vec<String>,
    points: Vec<P>,
}

/// [`PlotSink`] collecting both series and writing them as one JSON document
#[derive(Debug, Default, Serialize)]
pub struct JsonPlotWriter {
    scatter_3d: Series<(f64, f64, f64)>,
    scatter_2d: Series<(f64, f64)>,
}

impl PlotSink for JsonPlotWriter {
    fn scatter_3d(&mut self, axis_labels: [&str; 3], points: &[(f64, f64, f64)]) {
        self.scatter_3d.axes = axis_labels.iter().map(|s| s.to_string()).collect();
        self.scatter_3d.points.extend_from_slice(points);
    }

    fn scatter_2d(&mut self, axis_labels: [&str; 2], points: &[(f64, f64)]) {
        self.scatter_2d.axes = axis_labels.iter().map(|s| s.to_string()).collect();
        self.scatter_2d.points.extend_from_slice(points);
    }
}

impl JsonPlotWriter {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the collected series to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::Io { path: PathBuf::from(path), source };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.to_json()?.as_bytes()).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), "wrote plot data");
        Ok(())
    }
}
