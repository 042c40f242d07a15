#![allow(clippy::exit)]

mod cli;
mod commands;
mod context;
mod output;
mod prompt;
mod timing;

use anyhow::Result;
use clap::Parser as _;

use crate::cli::{Cli, Commands};
use crate::commands::register::Registration;
use crate::commands::{
    generate_completions, run_add, run_dashboard, run_delete, run_edit, run_list, run_login,
    run_logout, run_register, run_status,
};
use crate::context::AppContext;
use crate::output::Output;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    timing::init_tracing(cli.global.verbose, cli.global.timing);

    if let Err(err) = run(cli).await {
        Output::new().error(format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli { command, global } = cli;
    let load = || AppContext::load(&global);

    match command {
        Commands::Login { email, password } => run_login(load()?, email, password).await,
        Commands::Register {
            name,
            phone,
            email,
            password,
            role,
        } => {
            let registration = Registration {
                name,
                phone,
                email,
                password,
                role,
            };
            run_register(load()?, registration).await
        }
        Commands::Logout => run_logout(load()?),
        Commands::Status { check } => run_status(load()?, check).await,
        Commands::List {
            search,
            gender,
            sort,
        } => run_list(load()?, search, gender, sort).await,
        Commands::Add { fields } => run_add(load()?, fields).await,
        Commands::Edit { id, fields } => run_edit(load()?, id, fields).await,
        Commands::Delete { id, yes } => run_delete(load()?, id, yes).await,
        Commands::Dashboard => run_dashboard(load()?).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}
