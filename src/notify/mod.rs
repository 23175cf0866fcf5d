use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

mod base;
pub use base::*;
mod config;
pub use config::*;
mod email;
pub use email::*;
mod log;
pub use log::*;
mod webhook;
pub use webhook::*;

use crate::Alert;

// Awaited from the monitor loop, a slow notifier delays the next tick.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn kind(&self) -> &str;
    fn name(&self) -> &str;
    async fn on_fail(&self, alert: Arc<Alert>) -> Result<()>;
    async fn on_recover(&self, alert: Arc<Alert>) -> Result<()>;
}
