use clap::Parser;
use velib_processor::cli::{run, Cli};
use velib_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
