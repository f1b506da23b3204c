use celcollate::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{collate, prenatal},
    utils::{handle_error_and_exit, Result},
};
use clap::Parser;

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Collate(_) => "collate",
        Command::Prenatal(_) => "prenatal",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Collate(args) => collate::collate(args)?,
        Command::Prenatal(args) => prenatal::prenatal(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
