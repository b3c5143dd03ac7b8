use clap::Parser;

mod app;
mod commands;

use commands::cli::{Args, Commands};
use standin_core::config::{self, AppConfig, LoggingConfig};
use standin_core::{CliError, Input};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let cfg = match config::load_default() {
        Ok(cfg) => cfg,
        Err(e) => fail("loading configuration", &CliError::Config(e.to_string())),
    };
    if let Err(e) = init_tracing(&cfg.logging) {
        fail("initializing logging", &CliError::Config(e));
    }

    let (context, result) = dispatch(args, &cfg).await;
    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => fail(context, &e),
    }
}

fn fail(context: &str, err: &CliError) -> ! {
    eprintln!("Error in {context}: {err}");
    std::process::exit(exit_code_for_error(err));
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 1: run/standby/config failures
    // 2: usage errors
    match e {
        CliError::Usage(_) => 2,
        CliError::Run(_) | CliError::Config(_) | CliError::Io(_) => 1,
    }
}

async fn dispatch(args: Args, cfg: &AppConfig) -> (&'static str, Result<i32, CliError>) {
    let builder = app::switch_builder(cfg, &args);
    let mut out = tokio::io::stdout();

    match args.command {
        Some(Commands::File(ref file_args)) => {
            let source = app::file_source(&file_args.path);
            (
                "file",
                app::run_filter("file", builder, source, Input::stdin(), &mut out).await,
            )
        }
        Some(Commands::Run(ref run_args)) => {
            let (source, cancel_tx) = app::command_source(run_args);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = cancel_tx.send("interrupted".to_string()).await;
                }
            });
            (
                "run",
                app::run_filter("run", builder, source, Input::stdin(), &mut out).await,
            )
        }
        Some(Commands::String(ref string_args)) => {
            let source = app::string_source(string_args);
            (
                "string",
                app::run_filter("string", builder, source, Input::stdin(), &mut out).await,
            )
        }
        None => {
            let Some(exit_code) = args.exit_code else {
                return (
                    "check",
                    Err(CliError::Usage(
                        "an exit code is required when no subcommand is given".to_string(),
                    )),
                );
            };
            let ignore = args
                .ignore_newline
                .unwrap_or(cfg.switch.ignore_leading_newline);
            if args.pass_through && ignore {
                return (
                    "check",
                    Err(CliError::Usage(
                        "--pass-through requires --ignore-newline false; a swallowed leading \
                         newline would corrupt the passed-through data"
                            .to_string(),
                    )),
                );
            }
            (
                "check",
                app::run_check(exit_code, args.pass_through, builder, Input::stdin(), &mut out)
                    .await,
            )
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => config::data_dir().map_err(|e| e.to_string())?.join("logs"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("standin.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        // Nothing to log to; the filter stays silent.
        return Ok(());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
