//! Command-Line Interface Module
//!
//! Handles argument parsing and validation for the pvtilt application.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::config::DEFAULT_FILE_PREFIX;

// ===================== CLI =====================

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Directory containing the PVGIS monthly JSON exports
    #[arg(long, default_value = "./data", env = "PVTILT_DATA_DIR")]
    pub data_dir: PathBuf,

    /// File name prefix of the exports; "<N>.json" is appended for each N in --angle-range
    #[arg(long, default_value = DEFAULT_FILE_PREFIX, env = "PVTILT_FILE_PREFIX")]
    pub file_prefix: String,

    /// Numeric suffix range of the dataset files: "START-END" (inclusive)
    #[arg(long, value_parser = parse_range, default_value = "48-71", env = "PVTILT_ANGLE_RANGE")]
    pub angle_range: (u32, u32),

    /// Clearness index computation
    /// - ratio: tilted-plane irradiation / extraterrestrial irradiation (validated)
    /// - zenith: day-by-day noon zenith correction (unreliable, experimental)
    /// - horizontal: horizontal irradiation / horizontal extraterrestrial (K_T)
    #[arg(long, default_value = "ratio", value_parser = ["ratio", "zenith", "horizontal"], env = "PVTILT_CLEARNESS_MODE")]
    pub clearness_mode: String,

    /// Time zone for the zenith mode ("location", "system", "utc", or IANA time zone name)
    #[arg(long, default_value = "location", env = "PVTILT_TIMEZONE")]
    pub timezone: String,

    /// Fail when a dataset lacks a winter month instead of counting it as zero
    #[arg(long, env = "PVTILT_STRICT")]
    pub strict: bool,

    /// Report format
    #[arg(long, default_value = "text", value_parser = ["text", "json"], env = "PVTILT_FORMAT")]
    pub format: String,

    /// Write the scatter data (month/angle/irradiation) to this JSON file for plotting
    #[arg(long, env = "PVTILT_PLOT_DATA")]
    pub plot_data: Option<PathBuf>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long)]
    pub verbose: bool,

    /// Show build info from Cargo.lock at time of building
    #[arg(long)]
    pub show_build_info: bool,
}

// Define the structure to match what we serialized in build.rs
#[derive(Debug, Deserialize)]
pub struct DepInfo {
    pub name: String,
    pub version: String,
    pub checksum: Option<String>,
    pub source: Option<String>,
}

// ===================== CLI VALUE PARSERS =====================

fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 2 {
        return Err(format!("Range must be in format START-END (e.g., '48-71'), got '{}'", s));
    }
    let start: u32 =
        parts[0].trim().parse().map_err(|_| format!("Invalid start value: {}", parts[0]))?;
    let end: u32 = parts[1].trim().parse().map_err(|_| format!("Invalid end value: {}", parts[1]))?;
    if start > end {
        return Err(format!("Start ({}) cannot be greater than end ({})", start, end));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("48-71"), Ok((48, 71)));
        assert_eq!(parse_range("5-5"), Ok((5, 5)));
        assert!(parse_range("71-48").is_err());
        assert!(parse_range("48").is_err());
        assert!(parse_range("a-b").is_err());
        assert!(parse_range("-3-4").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["pvtilt"]).unwrap();
        assert_eq!(args.angle_range, crate::config::DEFAULT_ANGLE_FILES);
        assert_eq!(args.file_prefix, DEFAULT_FILE_PREFIX);
        assert_eq!(args.clearness_mode, "ratio");
        assert_eq!(args.format, "text");
        assert!(args.plot_data.is_none());
        assert!(!args.strict);
    }

    #[test]
    fn test_rejects_unknown_clearness_mode() {
        assert!(Args::try_parse_from(["pvtilt", "--clearness-mode", "magic"]).is_err());
    }
}
