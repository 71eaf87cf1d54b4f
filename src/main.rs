use anyhow::Result;
use dawriya::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
