use anyhow::Result;
use clap::Parser;
use payflow::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    payflow::logging::init(cli.verbose);
    cli.run().await
}
