use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use certscope::config::{AppConfig, Cli, OutputFormat};
use certscope::report::{render_json, render_text};
use certscope::TemplateSession;

/// Installs the stderr layer and, with `--log-file`, a file layer.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "certscope.log".to_string());

            let file_appender = RollingFileAppender::new(Rotation::NEVER, directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log_level, cli.log_file.as_deref());

    let config = match AppConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    info!("certscope {} starting", env!("CARGO_PKG_VERSION"));

    let connection = &config.connection;
    let session = match TemplateSession::connect(connection).await {
        Ok(session) => session,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let records = match session.enumerate(connection.search_timeout).await {
        Ok(records) => records,
        Err(e) => {
            error!("Template enumeration failed: {}", e);
            eprintln!("Error loading templates: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let output = match config.format {
        OutputFormat::Text => render_text(&records),
        OutputFormat::Json => match render_json(&records) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    ExitCode::SUCCESS
}
