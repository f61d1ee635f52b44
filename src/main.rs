use clap::Parser;
use risk_model_serving::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Inspect(args) => cli::inspect::run(args).await,
    }
}
