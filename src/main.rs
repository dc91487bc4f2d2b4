//! bestimate: flanking sequences and off-target genome preparation.
//! Entry point only; see `cli` and `subcommands/*`.

use anyhow::Result;
use bestimate::cli::Cli;
use bestimate::util::logging;

fn main() -> Result<()> {
    let cli = <Cli as clap::Parser>::parse();
    logging::init_logging(cli.log_file.as_deref())?;
    cli.run()
}
