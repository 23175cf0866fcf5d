use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

mod alert;
pub use alert::*;
mod health;
pub use health::*;
mod status;
pub use status::*;
mod worker;
use worker::{StopRequest, Worker};

use crate::{global, Notifier, Prober};

const KIND: &str = "monitor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    // with zero the timer is checked before the probe task ever runs, so probes fail
    pub timeout: Duration,
    pub period: Duration,
    pub sleep: Duration,
    pub fail_threshold: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            timeout: global::DEFAULT_TIMEOUT,
            period: global::DEFAULT_PERIOD,
            sleep: global::DEFAULT_SLEEP,
            fail_threshold: global::DEFAULT_FAIL_THRESHOLD,
        }
    }
}

enum Lifecycle {
    NotStarted,
    Running {
        stop_tx: mpsc::Sender<StopRequest>,
        handle: JoinHandle<()>,
    },
    Stopped,
}

/// One watched target and its check loop. Once stopped, a monitor cannot
/// be started again.
pub struct Monitor {
    name: String,
    target: String,
    settings: MonitorSettings,
    prober: Arc<dyn Prober>,
    notifiers: Vec<Arc<dyn Notifier>>,
    status_rx: Option<watch::Receiver<Status>>,
    lifecycle: Lifecycle,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("kind", &self.prober.kind())
            .field("settings", &self.settings)
            .field("notifiers", &self.notifiers.len())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Monitor {
    pub fn new(
        name: &str,
        target: &str,
        settings: MonitorSettings,
        prober: Arc<dyn Prober>,
    ) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            settings,
            prober,
            notifiers: vec![],
            status_rx: None,
            lifecycle: Lifecycle::NotStarted,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn with_notifiers(mut self, notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        self.notifiers.extend(notifiers);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running { .. })
    }

    pub fn status(&self) -> Status {
        self.status_rx
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("empty name");
        }
        if self.target.is_empty() {
            bail!("[{} / {}] empty target", KIND, self.name);
        }
        if self.settings.period.is_zero() {
            bail!("[{} / {}] period must be greater than zero", KIND, self.name);
        }
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.validate()?;
        let runtime = Handle::try_current()
            .with_context(|| format!("[{} / {}] no tokio runtime to run on", KIND, self.name))?;
        match self.lifecycle {
            Lifecycle::NotStarted => {}
            Lifecycle::Running { .. } => bail!("[{} / {}] already running", KIND, self.name),
            Lifecycle::Stopped => {
                bail!("[{} / {}] stopped monitors cannot be restarted", KIND, self.name)
            }
        }

        // Only one stop request is ever sent, so a single slot never blocks.
        let (stop_tx, stop_rx) = mpsc::channel(1);
        let (status_tx, status_rx) = watch::channel(Status::Healthy);
        let worker = Worker {
            name: self.name.clone(),
            target: self.target.clone(),
            settings: self.settings,
            prober: Arc::clone(&self.prober),
            notifiers: self.notifiers.clone(),
            health: Health::new(self.settings.fail_threshold),
            status_tx,
            stop_rx,
        };
        let handle = runtime.spawn(worker.run());

        self.status_rx = Some(status_rx);
        self.lifecycle = Lifecycle::Running { stop_tx, handle };
        Ok(())
    }

    // A callback already running is allowed to finish, none fires after this returns.
    pub async fn stop(&mut self) -> Result<()> {
        let (stop_tx, handle) = match std::mem::replace(&mut self.lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running { stop_tx, handle } => (stop_tx, handle),
            other => {
                self.lifecycle = other;
                bail!("[{} / {}] not running", KIND, self.name);
            }
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        let acked = match stop_tx.send(ack_tx).await {
            Ok(()) => ack_rx.await.is_ok(),
            Err(_) => false,
        };
        handle
            .await
            .with_context(|| format!("[{} / {}] loop panicked", KIND, self.name))?;
        if !acked {
            return Err(anyhow!(
                "[{} / {}] loop exited without acknowledging the stop request",
                KIND,
                self.name
            ));
        }

        log::info!("[{} / {}]: stopped", KIND, self.name);
        Ok(())
    }
}
