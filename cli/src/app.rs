//! Assembly layer: build the switch engine and the standby source for one
//! invocation, then drive the runner.

use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

use standin_core::config::AppConfig;
use standin_core::{
    runner, CliError, CommandSource, FileSource, Input, StandbySource, SwitchBuilder, TextSource,
};

use crate::commands::cli::{Args, RunArgs, StringArgs};

pub fn switch_builder(cfg: &AppConfig, args: &Args) -> SwitchBuilder {
    let ignore = args
        .ignore_newline
        .unwrap_or(cfg.switch.ignore_leading_newline);
    SwitchBuilder::new()
        .ignore_leading_newline(ignore)
        .switch_by_terminal(cfg.switch.by_terminal)
}

pub fn string_source(args: &StringArgs) -> Arc<dyn StandbySource> {
    let mut value = args.value.join(" ");
    if !args.no_newline {
        value.push('\n');
    }
    Arc::new(TextSource::new(value))
}

/// Build the command standby source plus the sender half of its
/// cancellation channel (wired to ctrl-c by the dispatcher).
pub fn command_source(args: &RunArgs) -> (Arc<dyn StandbySource>, mpsc::Sender<String>) {
    let (cancel_tx, cancel_rx) = mpsc::channel(1);
    let mut parts = args.command.iter();
    let program = parts.next().cloned().unwrap_or_default();
    let rest: Vec<String> = parts.cloned().collect();
    let source = CommandSource::new(program, rest).cancel_on(cancel_rx);
    (Arc::new(source), cancel_tx)
}

pub fn file_source(path: &std::path::Path) -> Arc<dyn StandbySource> {
    Arc::new(FileSource::new(path))
}

/// Run one filter mode: substitute the standby source when the piped input
/// carries no data, otherwise pass the input through untouched.
#[tracing::instrument(name = "app.run_filter", skip(builder, source, input, out))]
pub async fn run_filter<W>(
    mode: &'static str,
    builder: SwitchBuilder,
    source: Arc<dyn StandbySource>,
    input: Input,
    out: &mut W,
) -> Result<i32, CliError>
where
    W: AsyncWrite + Unpin,
{
    let switch = builder.standby(source).build();
    runner::run(&switch, input, out).await?;
    Ok(0)
}

/// Root check mode: exit 0 when the piped input carries no data, otherwise
/// report `exit_code`, optionally passing the data through to `out`. Relies
/// on the switch's `None` sentinel to tell "no data and nothing to
/// substitute" from an empty stream.
#[tracing::instrument(name = "app.run_check", skip(builder, input, out))]
pub async fn run_check<W>(
    exit_code: i32,
    pass_through: bool,
    builder: SwitchBuilder,
    input: Input,
    out: &mut W,
) -> Result<i32, CliError>
where
    W: AsyncWrite + Unpin,
{
    let switch = builder.build();
    match switch.switch(input).await {
        Some(stream) => {
            if pass_through {
                runner::copy_stream(stream, out).await?;
            }
            Ok(exit_code)
        }
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn bytes_input(data: &[u8]) -> Input {
        Input::new(Cursor::new(data.to_vec()))
    }

    fn builder() -> SwitchBuilder {
        switch_builder(&AppConfig::default(), &parse(&["standin", "0"]))
    }

    async fn drain_source(source: &Arc<dyn StandbySource>) -> Vec<u8> {
        use tokio::io::AsyncReadExt;
        let mut stream = source.activate().await.expect("expected a stream");
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn string_source_joins_values_and_appends_a_newline() {
        let args = parse(&["standin", "string", "standby", "data"]);
        let string_args = match args.command {
            Some(crate::commands::cli::Commands::String(s)) => s,
            other => panic!("unexpected parse: {other:?}"),
        };
        assert_eq!(
            drain_source(&string_source(&string_args)).await,
            b"standby data\n".to_vec()
        );
    }

    #[tokio::test]
    async fn string_source_honors_the_no_newline_flag() {
        let args = parse(&["standin", "string", "-n", "standby", "data"]);
        let string_args = match args.command {
            Some(crate::commands::cli::Commands::String(s)) => s,
            other => panic!("unexpected parse: {other:?}"),
        };
        assert_eq!(
            drain_source(&string_source(&string_args)).await,
            b"standby data".to_vec()
        );
    }

    #[tokio::test]
    async fn filter_substitutes_the_string_standby_on_empty_input() {
        let source = Arc::new(TextSource::new("standby data\n"));
        let mut out = Vec::new();
        let code = run_filter("string", builder(), source, bytes_input(b""), &mut out)
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(out, b"standby data\n".to_vec());
    }

    #[tokio::test]
    async fn filter_passes_piped_data_through_untouched() {
        let source = Arc::new(TextSource::new("unused\n"));
        let mut out = Vec::new();
        run_filter("string", builder(), source, bytes_input(b"input data"), &mut out)
            .await
            .unwrap();
        assert_eq!(out, b"input data".to_vec());
    }

    #[tokio::test]
    async fn filter_surfaces_a_missing_standby_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = file_source(&dir.path().join("missing"));
        let mut out = Vec::new();
        let err = run_filter("file", builder(), source, bytes_input(b""), &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("open file"));
    }

    #[tokio::test]
    async fn check_reports_zero_on_empty_input() {
        let mut out = Vec::new();
        let code = run_check(1, false, builder(), bytes_input(b""), &mut out)
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn check_reports_the_exit_code_when_data_is_present() {
        let mut out = Vec::new();
        let code = run_check(1, false, builder(), bytes_input(b"input data"), &mut out)
            .await
            .unwrap();
        assert_eq!(code, 1);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn check_pass_through_copies_the_data_byte_exactly() {
        let builder = builder().ignore_leading_newline(false);
        let mut out = Vec::new();
        let code = run_check(1, true, builder, bytes_input(b"\ninput data"), &mut out)
            .await
            .unwrap();
        assert_eq!(code, 1);
        assert_eq!(out, b"\ninput data".to_vec());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn filter_runs_the_command_standby() {
        let args = parse(&["standin", "run", "sh", "-c", "printf 'standby cmd: test\\n'"]);
        let run_args = match args.command {
            Some(crate::commands::cli::Commands::Run(r)) => r,
            other => panic!("unexpected parse: {other:?}"),
        };
        let (source, _cancel_tx) = command_source(&run_args);
        let mut out = Vec::new();
        let code = run_filter("run", builder(), source, bytes_input(b""), &mut out)
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(out, b"standby cmd: test\n".to_vec());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn filter_fails_when_the_command_standby_writes_stderr() {
        let args = parse(&[
            "standin",
            "run",
            "sh",
            "-c",
            "printf 'standby cmd errout: test\\n' >&2",
        ]);
        let run_args = match args.command {
            Some(crate::commands::cli::Commands::Run(r)) => r,
            other => panic!("unexpected parse: {other:?}"),
        };
        let (source, _cancel_tx) = command_source(&run_args);
        let mut out = Vec::new();
        let err = run_filter("run", builder(), source, bytes_input(b""), &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("standby cmd errout: test"));
    }
}
