use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "wavefront-emitter",
    version,
    about = "Demo server for the Wavefront request metrics emitter",
    long_about = "Serves GET /ping and GET /health behind the request metrics emitter. Every request produces latency, bytes in/out and status-class points sent to Wavefront (or to a Prometheus endpoint with `sink: prometheus`)."
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "WAVEFRONT_EMITTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server bind address (overrides the configuration file)
    #[arg(long, env = "WAVEFRONT_EMITTER_HOST")]
    pub host: Option<String>,

    /// Server port (overrides the configuration file)
    #[arg(short, long, env = "WAVEFRONT_EMITTER_PORT")]
    pub port: Option<u16>,

    /// Log filter used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "WAVEFRONT_EMITTER_JSON_LOGS")]
    pub json_logs: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
