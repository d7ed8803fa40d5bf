use clap::Parser;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

mod averaging;
mod clearness;
mod cli;
mod config;
mod dataset;
mod error;
mod optimize;
mod output;
mod pipeline;
mod plot;
mod solar;
mod time;

use cli::{Args, DepInfo};
use config::AnalysisConfig;
use plot::{JsonPlotWriter, emit_scatter};

// ===================== LOGGING =====================

fn init_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_build_info() -> Result<(), Box<dyn std::error::Error>> {
    println!("Built from Git commit: {}\n", env!("APP_GIT_HASH"));
    const DEP_INFO_RAW: &str = include_str!(env!("DEPS_INFO_PATH"));
    let deps: Vec<DepInfo> = serde_json::from_str(DEP_INFO_RAW)?;

    println!("Found {} dependencies.", deps.len());
    for dep in deps {
        println!("- {} v{}", dep.name, dep.version);
        if let Some(sum) = dep.checksum {
            println!("    Checksum: {}", sum);
        }
        if let Some(src) = dep.source {
            println!("    Source:   {}", src);
        }
    }
    Ok(())
}

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.show_build_info {
        return print_build_info();
    }

    init_logging(args.verbose);

    let config = AnalysisConfig::from_args(&args);
    debug!(?config, "analysis configuration");

    let analysis = pipeline::run(&config)?;

    if let Some(path) = args.plot_data.as_deref() {
        let mut writer = JsonPlotWriter::default();
        emit_scatter(&mut writer, &analysis.averaged, &analysis.totals, config.optimize_quantity);
        writer.write_to(path)?;
    }

    match args.format.as_str() {
        "json" => output::print_report_json(&analysis.report)?,
        _ => output::print_report(&analysis.report),
    }

    Ok(())
}
