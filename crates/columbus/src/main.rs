use clap::Parser;
use color_eyre::Result;
use columbus::cli::Cli;
use columbus::errors;

#[tokio::main]
async fn main() -> Result<()> {
    errors::init()?;
    let args = Cli::parse();
    columbus::run(args).await
}
