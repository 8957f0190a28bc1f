use clap::Parser;
use tradeqa::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
