use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    monlite::cmd::start().await
}
