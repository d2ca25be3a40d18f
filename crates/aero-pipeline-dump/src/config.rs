use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use aero_pipeline_inspect::VisibilityPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text tables.
    Text,
    /// The resolved pipeline as pretty-printed JSON.
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "aero-pipeline-dump", version, about)]
struct Args {
    /// Capture document (JSON) holding a pipeline snapshot and its resource catalog.
    capture: PathBuf,

    /// List slots that are bound but not referenced by the shader.
    ///
    /// Environment variable: `AERO_PIPELINE_SHOW_DISABLED`.
    #[arg(long, env = "AERO_PIPELINE_SHOW_DISABLED")]
    show_disabled: bool,

    /// List slots with nothing bound.
    ///
    /// Environment variable: `AERO_PIPELINE_SHOW_EMPTY`.
    #[arg(long, env = "AERO_PIPELINE_SHOW_EMPTY")]
    show_empty: bool,

    /// Output format.
    ///
    /// Environment variable: `AERO_PIPELINE_FORMAT`.
    #[arg(long, value_enum, env = "AERO_PIPELINE_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log filter (tracing-subscriber EnvFilter syntax). Logs go to stderr.
    ///
    /// Environment variable: `AERO_PIPELINE_LOG`.
    #[arg(long, env = "AERO_PIPELINE_LOG")]
    log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub capture: PathBuf,
    pub policy: VisibilityPolicy,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    pub fn load() -> Self {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Self {
        let log_level = args
            .log_level
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "warn".to_string());

        Self {
            capture: args.capture,
            policy: VisibilityPolicy::new(args.show_disabled, args.show_empty),
            format: args.format,
            output: args.output,
            log_level,
        }
    }
}
