mod cli;
mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    platform::run_app(cli::Cli::parse())
}
