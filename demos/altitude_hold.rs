// demos/altitude_hold.rs

use clap::{Parser, ValueEnum};
use free_flight_altitude_hold::{
    export, extract_metrics, load_parameters, simulate, AcceptanceCriteria, MetricsConfig,
    SimulationParameters,
};
use std::io;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Metrics summary and acceptance report
    Summary,
    /// Metrics, acceptance report and full record as JSON
    Json,
    /// Full record as CSV
    Csv,
}

/// Run a PID altitude hold simulation and report its step-response metrics.
#[derive(Parser, Debug)]
#[command(author, version, about = "PID altitude hold simulation")]
struct Cli {
    /// YAML parameter file; built-in defaults when omitted
    #[arg(long)]
    params: Option<PathBuf>,

    /// Settling band as a fraction of the commanded altitude
    #[arg(long, default_value_t = 0.05)]
    tolerance: f64,

    /// Largest acceptable overshoot in percent
    #[arg(long, default_value_t = 5.0)]
    max_overshoot: f64,

    /// Largest acceptable steady-state error in meters
    #[arg(long, default_value_t = 0.5)]
    max_steady_state_error: f64,

    /// Latest acceptable settling time in seconds
    #[arg(long)]
    max_settling_time: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Summary)]
    format: Format,
}

fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let cli = Cli::parse();
    let params = match &cli.params {
        Some(path) => load_parameters(path)?,
        None => SimulationParameters::default(),
    };

    let record = simulate(&params)?;
    let metrics = extract_metrics(&record, &MetricsConfig::with_tolerance(cli.tolerance))?;
    let criteria = AcceptanceCriteria {
        max_overshoot_percent: Some(cli.max_overshoot),
        max_steady_state_error: Some(cli.max_steady_state_error),
        max_settling_time: cli.max_settling_time,
        max_rise_time: None,
    };
    let report = criteria.evaluate(&metrics);

    match cli.format {
        Format::Summary => {
            let show = |value: Option<f64>| value.map_or("undefined".to_owned(), |v| format!("{v:.3} s"));
            println!("samples             {}", record.len());
            println!("reference           {:.3} m", metrics.reference);
            println!("overshoot           {:.3} %", metrics.overshoot_percent);
            println!("settling time       {}", show(metrics.settling_time));
            println!("rise time           {}", show(metrics.rise_time));
            println!("steady-state error  {:.4} m", metrics.steady_state_error);
            println!("thrust variation    {:.3}", metrics.thrust_variation);
            println!();
            println!("{report}");
        }
        Format::Json => {
            let output = serde_json::json!({
                "metrics": metrics,
                "acceptance": report,
                "record": record,
            });
            println!("{}", export::to_json(&output)?);
        }
        Format::Csv => export::write_record_csv(&record, io::stdout().lock())?,
    }

    Ok(())
}
