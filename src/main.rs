use anyhow::Result;
use dappterm::app::handler;

#[tokio::main]
async fn main() -> Result<()> {
    handler::init().await
}
