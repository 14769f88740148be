use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Resolve the configuration a provisioning run starts from
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct HiveutilArgs {
    /// Log level (trace, debug, info, warn, error, fatal, panic), overrides HIVEUTIL_LOG_LEVEL
    #[arg(short, long)]
    pub log_level: Option<String>,
    #[arg(short, long, default_value = "plain")]
    pub out_format: OutFormat,
    #[clap(subcommand)]
    pub subcommand: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutFormat {
    Plain,
    Json
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the registry pull secret
    PullSecret(PullSecretArgs),
    /// Resolve the release image pull spec from a release source
    ReleaseImage(ReleaseImageArgs),
    /// Show the kube API server and default namespace
    Context,
}

#[derive(Args, Debug)]
pub struct PullSecretArgs {
    /// Pull secret value, ignored when PULL_SECRET is set
    #[arg(long, default_value = "")]
    pub pull_secret: String,
    /// File holding the pull secret
    #[arg(long)]
    pub pull_secret_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReleaseImageArgs {
    /// URL of the release metadata document
    #[arg(short, long)]
    pub url: String,
    /// Fetch deadline, overrides HIVEUTIL_RELEASE_TIMEOUT_SECS
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,
}
