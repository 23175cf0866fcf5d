use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::Prober;

pub type ProbeFunc = Arc<dyn Fn(&str) -> Result<()> + Send + Sync>;

pub struct FnProber {
    kind: String,
    probe_fn: ProbeFunc,
}

impl FnProber {
    pub fn new<F>(kind: &str, probe_fn: F) -> Self
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            kind: kind.to_string(),
            probe_fn: Arc::new(probe_fn),
        }
    }
}

#[async_trait]
impl Prober for FnProber {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn probe(&self, target: &str) -> Result<()> {
        let probe_fn = Arc::clone(&self.probe_fn);
        let target = target.to_string();
        tokio::task::spawn_blocking(move || probe_fn(&target)).await?
    }
}
