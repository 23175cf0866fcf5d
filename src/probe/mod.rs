use anyhow::Result;
use async_trait::async_trait;

mod func;
pub use func::*;
mod http;
pub use http::*;
mod tcp;
pub use tcp::*;

/// A single reachability check. `Ok` means the target is alive.
#[async_trait]
pub trait Prober: Send + Sync {
    fn kind(&self) -> &str;
    async fn probe(&self, target: &str) -> Result<()>;
}
