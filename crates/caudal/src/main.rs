mod cmd;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "caudal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a transactions file and show what would load
    Check(cmd::check::Args),
    /// Filter, aggregate and print a dashboard report
    Report(cmd::report::Args),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check(args) => cmd::check::main(&args),
        Command::Report(args) => cmd::report::main(&args),
    }
}
