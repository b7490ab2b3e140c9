use anyhow::Result;
use clap::Parser;
use is_it_fiction::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::run(&cli)
}
