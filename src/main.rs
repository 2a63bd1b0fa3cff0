use clap::Parser;
use xenovaf::{
    cli::{init_verbose, Cli, Command},
    commands::{correct, split},
    util::Result,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    match cli.command {
        Command::Correct(args) => correct(args)?,
        Command::Split(args) => split(args)?,
    }
    Ok(())
}
