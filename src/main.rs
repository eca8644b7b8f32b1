use clap::Parser;
use team_sync::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Save(args) => cli::save::run(args).await,
        Command::Show(args) => cli::show::run(args).await,
        Command::Photo(args) => cli::photo::run(args).await,
        Command::Watch => cli::watch::run().await,
    }
}
