use clap::Parser;
use twscreener::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
