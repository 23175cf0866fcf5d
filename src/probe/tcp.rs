use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::TcpStream;

use super::Prober;

const KIND: &str = "tcp";

#[derive(Debug, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    fn kind(&self) -> &str {
        KIND
    }

    async fn probe(&self, target: &str) -> Result<()> {
        let addr = target.strip_prefix("tcp://").unwrap_or(target);
        TcpStream::connect(addr)
            .await
            .with_context(|| format!("failed to connect to {}", addr))?;
        Ok(())
    }
}
