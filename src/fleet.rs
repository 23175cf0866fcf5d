use anyhow::{bail, Result};

use crate::Monitor;

const KIND: &str = "fleet";

#[derive(Debug, Default)]
pub struct Fleet {
    monitors: Vec<Monitor>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, monitor: Monitor) {
        if self.monitors.iter().any(|m| m.name() == monitor.name()) {
            log::warn!(
                "[{}] monitor [{}] name is duplicated, ignored!",
                KIND,
                monitor.name()
            );
            return;
        }
        self.monitors.push(monitor);
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    /// Starts every monitor in order. If one fails to start, the ones
    /// already started are stopped again and the error is returned.
    pub async fn start(&mut self) -> Result<()> {
        for i in 0..self.monitors.len() {
            if let Err(err) = self.monitors[i].start() {
                log::error!(
                    "[{}] failed to start monitor [{}]: {:#}",
                    KIND,
                    self.monitors[i].name(),
                    err
                );
                for m in self.monitors[..i].iter_mut() {
                    if let Err(err) = m.stop().await {
                        log::error!("[{}] failed to stop monitor [{}]: {:#}", KIND, m.name(), err);
                    }
                }
                let name = self.monitors[i].name().to_string();
                return Err(err.context(format!("failed to start monitor [{}]", name)));
            }
        }
        log::info!("[{}] {} monitors started", KIND, self.monitors.len());
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        let mut failed = vec![];
        for m in self.monitors.iter_mut().filter(|m| m.is_running()) {
            log::debug!("[{}] stopping monitor [{}]", KIND, m.name());
            if let Err(err) = m.stop().await {
                log::error!("[{}] failed to stop monitor [{}]: {:#}", KIND, m.name(), err);
                failed.push(m.name().to_string());
            }
        }
        if !failed.is_empty() {
            bail!("[{}] failed to stop monitors: {}", KIND, failed.join(", "));
        }
        log::info!("[{}] all monitors stopped", KIND);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{monitor::tests::ScriptedProber, MonitorSettings};

    fn monitor(name: &str, target: &str) -> Monitor {
        let settings = MonitorSettings {
            period: Duration::from_millis(10),
            timeout: Duration::from_millis(5),
            ..Default::default()
        };
        Monitor::new(name, target, settings, Arc::new(ScriptedProber::new(vec![], true)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_stop() {
        let mut fleet = Fleet::new();
        fleet.add(monitor("a", "http://a"));
        fleet.add(monitor("b", "http://b"));
        fleet.add(monitor("a", "http://c"));
        assert_eq!(fleet.len(), 2);

        fleet.start().await.unwrap();
        assert!(fleet.monitors().iter().all(|m| m.is_running()));

        fleet.stop().await.unwrap();
        assert!(fleet.monitors().iter().all(|m| !m.is_running()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rolls_back() {
        let mut fleet = Fleet::new();
        fleet.add(monitor("a", "http://a"));
        fleet.add(monitor("b", ""));
        fleet.add(monitor("c", "http://c"));

        let err = fleet.start().await.unwrap_err();
        assert!(format!("{:#}", err).contains("failed to start monitor [b]"));
        assert!(fleet.monitors().iter().all(|m| !m.is_running()));

        // nothing left to stop
        fleet.stop().await.unwrap();
    }
}
