//! Tiller CLI

mod cli;

use cli::{Cli, Command, access, logging, quote};

fn main() -> anyhow::Result<()> {
    let cli = Cli::load();

    logging::init_subscriber(&cli.logging)?;

    match &cli.command {
        Command::Quote(args) => quote::run(&cli.fixtures, args),
        Command::Access(args) => access::run(&cli.fixtures, args),
    }
}
