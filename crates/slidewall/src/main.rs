mod bootstrap;
mod cli;
mod commands;
mod export;
mod listing;
mod paths;
mod run;
mod state;

use anyhow::Result;

use crate::cli::Command;

fn main() -> Result<()> {
    let args = cli::parse();
    run::initialise_tracing();
    match args.command {
        Command::Run(run_args) => run::run(run_args),
        Command::Effects(effects_args) => listing::run(effects_args),
        Command::Render(render_args) => export::render(render_args),
        Command::Randomize(randomize_args) => export::randomize(randomize_args),
    }
}
