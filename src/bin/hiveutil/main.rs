use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{Level, Log, Record};

use hiveutil::core::config::{compose_config, HiveutilConfig};
use hiveutil::service::client_context_service::ClientContextService;
use hiveutil::service::logger_service::{Logger, LoggerBuilder};
use hiveutil::service::pull_secret_service::PullSecretService;
use hiveutil::service::release_image_service::ReleaseImageService;
use hiveutil::ProcessEnv;

use crate::args::{Commands, HiveutilArgs};
use crate::command::{execute_command, ContextOutcome, PullSecretOutcome, ReleaseImageOutcome};

mod args;
mod command;

fn log_event(logger: &Logger, level: Level, args: std::fmt::Arguments) {
    logger.log(&Record::builder()
        .level(level)
        .target("hiveutil")
        .args(args)
        .build());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args: HiveutilArgs = HiveutilArgs::parse();
    let app_config: HiveutilConfig = compose_config("hiveutil", "hiveutil")
        .context("Error loading configuration")?;

    let level = args.log_level.unwrap_or_else(|| app_config.log_level.clone());
    let logger = LoggerBuilder::new(ProcessEnv).build(&level)
        .context("Error building logger")?;
    let logger = &logger;

    let succeeded = match args.subcommand {
        Commands::PullSecret(pull_secret_args) => {
            execute_command(
                args.out_format,
                || async move {
                    let secret = PullSecretService::new(ProcessEnv)
                        .resolve(&pull_secret_args.pull_secret, pull_secret_args.pull_secret_file.as_deref())?;
                    log_event(logger, Level::Info, format_args!("Pull secret resolution completed"));
                    Ok::<_, anyhow::Error>(PullSecretOutcome { source: secret.source(), length: secret.as_str().len() })
                },
            ).await
        }
        Commands::ReleaseImage(release_args) => {
            let timeout = release_args.timeout_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| app_config.release_timeout());
            execute_command(
                args.out_format,
                || async move {
                    let pull_spec = ReleaseImageService::new(timeout)
                        .resolve(&release_args.url)
                        .await
                        .with_context(|| format!("Error resolving release image from {}", release_args.url))?;
                    log_event(logger, Level::Info, format_args!("Resolved release image {pull_spec}"));
                    Ok::<_, anyhow::Error>(ReleaseImageOutcome { pull_spec })
                },
            ).await
        }
        Commands::Context => {
            execute_command(
                args.out_format,
                || async move {
                    let svc = ClientContextService::new(ProcessEnv);
                    let config = svc.client_config().await?;
                    let default_namespace = svc.default_namespace()?;
                    log_event(logger, Level::Debug, format_args!("Using namespace {default_namespace}"));
                    Ok::<_, anyhow::Error>(ContextOutcome { cluster_url: config.cluster_url.to_string(), default_namespace })
                },
            ).await
        }
    };
    logger.flush();

    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
