use clap::Parser;
use lr1gen::cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = cli::Cli::parse();
    cli::run(&args)
}
