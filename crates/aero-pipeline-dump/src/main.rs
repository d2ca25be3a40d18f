use std::{fs, fs::File, io::BufReader};

use aero_pipeline_inspect::export::render_text_report;
use aero_pipeline_inspect::PipelineCapture;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, OutputFormat};

fn main() -> anyhow::Result<()> {
    let config = Config::load();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let file = File::open(&config.capture)
        .with_context(|| format!("open capture {}", config.capture.display()))?;
    let capture = PipelineCapture::from_reader(BufReader::new(file))
        .with_context(|| format!("load capture {}", config.capture.display()))?;

    let pipeline = capture.resolve(config.policy);
    tracing::debug!(
        stages = pipeline.stages.iter().filter(|s| s.bound).count(),
        mismatch = pipeline.mismatch.has_mismatch(),
        "resolved pipeline"
    );

    let mut report = match config.format {
        OutputFormat::Text => render_text_report(&pipeline),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&pipeline).context("serialize resolved pipeline")?
        }
    };
    if !report.ends_with('\n') {
        report.push('\n');
    }

    match &config.output {
        Some(path) => {
            fs::write(path, &report).with_context(|| format!("write {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => print!("{report}"),
    }
    Ok(())
}
