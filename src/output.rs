//! Output Formatting Module
//!
//! Renders the analysis report for the terminal or as JSON.

use std::fmt::Write;

use crate::config::ClearnessMode;
use crate::error::Result;
use crate::pipeline::AnalysisReport;

// ===================== TEXT REPORT =====================

/// Render the human-readable report.
///
/// The optimal value and extraterrestrial totals are rounded to whole kWh/m²;
/// clearness indices are printed unrounded.
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "Location: {:.3}°, {:.3}° ({} datasets, {}-{})",
        report.latitude, report.longitude, report.dataset_count, report.year_min, report.year_max
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "For a winter house, the optimal PV angle is:");
    let _ = writeln!(out, "Optimal PV tilt angle: {} degrees", report.optimal.angle);
    let _ = writeln!(
        out,
        "Optimal average monthly energy per square meter of PV: {:.0} kWh/m^2 ({})",
        report.optimal.value, report.quantity
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Extraterrestrial irradiation (monthly total, year-averaged):");
    let _ = writeln!(out, "{:-<44}", "");
    let _ = writeln!(out, "{:<12} {:>14} {:>16}", "Month", "Normal (kWh/m²)", "Horizontal");
    let _ = writeln!(out, "{:-<44}", "");
    for (i, e) in report.extraterrestrial.iter().enumerate() {
        let horizontal = report
            .extraterrestrial_horizontal
            .as_ref()
            .and_then(|h| h.get(i))
            .map(|h| format!("{:.0}", h.kwh_m2))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "{:<12} {:>14.0} {:>16}", e.month.name(), e.kwh_m2, horizontal);
    }
    let _ = writeln!(out, "{:-<44}", "");
    let _ = writeln!(out);

    if report.clearness_mode == ClearnessMode::Zenith.name() {
        let _ = writeln!(
            out,
            "WARNING: zenith-corrected clearness index is experimental and known to be unreliable."
        );
    }
    let _ = writeln!(out, "Clearness index ({}):", report.clearness_mode);
    for c in &report.clearness_index {
        let _ = writeln!(out, "  {:<10}: {}", c.month.name(), c.index);
    }

    out
}

/// Print the human-readable report to stdout.
pub fn print_report(report: &AnalysisReport) {
    print!("{}", format_report(report));
}

// ===================== JSON REPORT =====================

pub fn format_report_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn print_report_json(report: &AnalysisReport) -> Result<()> {
    println!("{}", format_report_json(report)?);
    Ok(())
}

// ===================== TESTS =====================
