use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "standin",
    version,
    about = "Switch the piped input to another one if no data from the piped input",
    long_about = "standin switches the piped input to another one if no data came through \
                  the pipe, and can simply be used to check whether any data arrived at all.",
    args_conflicts_with_subcommands = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Exit code to report when the piped input carries data.
    #[arg(value_name = "EXIT_CODE")]
    pub exit_code: Option<i32>,

    /// Pass the piped input through to stdout while checking.
    #[arg(short = 'p', long)]
    pub pass_through: bool,

    /// Ignore a leading newline while sniffing the input.
    #[arg(short = 'l', long, global = true, value_name = "BOOL")]
    pub ignore_newline: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Switch the piped input to "cat <FILE>"
    File(FileArgs),
    /// Switch the piped input to "run <COMMAND> [args]..."
    Run(RunArgs),
    /// Switch the piped input to "echo <STRING>..."
    String(StringArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FileArgs {
    /// File whose content stands in for the missing input.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Command (and its arguments) whose stdout stands in for the missing
    /// input. Run verbatim, without a shell.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct StringArgs {
    /// Value that stands in for the missing input. Multiple values are
    /// joined with spaces.
    #[arg(required = true, value_name = "STRING")]
    pub value: Vec<String>,

    /// Do not output the trailing newline.
    #[arg(short = 'n')]
    pub no_newline: bool,
}
