use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Local;
use tokio::{
    sync::{mpsc, oneshot, watch},
    time,
};

use super::{Alert, Health, MonitorSettings, Status, Transition, KIND};
use crate::{Notifier, Prober};

pub(crate) type StopRequest = oneshot::Sender<()>;

// only this task touches `health`
pub(crate) struct Worker {
    pub(crate) name: String,
    pub(crate) target: String,
    pub(crate) settings: MonitorSettings,
    pub(crate) prober: Arc<dyn Prober>,
    pub(crate) notifiers: Vec<Arc<dyn Notifier>>,
    pub(crate) health: Health,
    pub(crate) status_tx: watch::Sender<Status>,
    pub(crate) stop_rx: mpsc::Receiver<StopRequest>,
}

impl Worker {
    pub(crate) async fn run(mut self) {
        let name = self.name.clone();
        scopeguard::defer! {
            log::debug!("[{} / {}]: loop exited", KIND, name);
        }

        log::info!(
            "[{} / {}]: monitoring {} every {:?} (timeout {:?}, fails {})",
            KIND,
            self.name,
            self.target,
            self.settings.period,
            self.settings.timeout,
            self.settings.fail_threshold,
        );

        loop {
            tokio::select! {
                biased;
                req = self.stop_rx.recv() => {
                    self.acknowledge(req);
                    return;
                }
                _ = time::sleep(self.settings.period) => {}
            }

            if let Transition::Failed { .. } = self.tick().await {
                log::info!(
                    "[{} / {}]: going to sleep for {:?}",
                    KIND,
                    self.name,
                    self.settings.sleep
                );
                tokio::select! {
                    biased;
                    req = self.stop_rx.recv() => {
                        self.acknowledge(req);
                        return;
                    }
                    _ = time::sleep(self.settings.sleep) => {}
                }
            }
        }
    }

    // a closed request channel means the owning `Monitor` was dropped
    fn acknowledge(&self, req: Option<StopRequest>) {
        match req {
            Some(ack) => {
                log::info!("[{} / {}]: received the stop signal, exiting...", KIND, self.name);
                let _ = ack.send(());
            }
            None => {
                log::warn!("[{} / {}]: monitor dropped while running, exiting...", KIND, self.name);
            }
        }
    }

    async fn tick(&mut self) -> Transition {
        let pre_status = self.health.status();

        let (transition, failures, message) = match self.probe().await {
            Ok(()) => {
                log::debug!("[{} / {}]: probe ok", KIND, self.name);
                (self.health.record_success(), 0, "recovered".to_string())
            }
            Err(err) => {
                log::error!("[{} / {}]: probe failed - {:#}", KIND, self.name, err);
                let failures = self.health.consecutive_failures() + 1;
                (self.health.record_failure(), failures, format!("{:#}", err))
            }
        };
        self.status_tx.send_replace(self.health.status());

        if transition != Transition::Steady {
            let alert = Alert {
                name: self.name.clone(),
                target: self.target.clone(),
                kind: self.prober.kind().to_string(),
                status: self.health.status(),
                pre_status,
                failures,
                message,
                time: Local::now(),
            };
            self.alert(transition, Arc::new(alert)).await;
        }

        transition
    }

    async fn probe(&self) -> Result<()> {
        let prober = Arc::clone(&self.prober);
        let target = self.target.clone();
        // aborted on every way out, a probe never outlives its tick
        let mut task = scopeguard::guard(
            tokio::spawn(async move { prober.probe(&target).await }),
            |task| task.abort(),
        );

        tokio::select! {
            biased;
            res = &mut *task => res.unwrap_or_else(|err| Err(anyhow!("probe task failed: {}", err))),
            _ = time::sleep(self.settings.timeout) => {
                Err(anyhow!("probe timed out after {:?}", self.settings.timeout))
            }
        }
    }

    async fn alert(&self, transition: Transition, alert: Arc<Alert>) {
        match transition {
            Transition::Failed { repeated: false } => log::warn!(
                "[{} / {}]: status changed [{}] ==> [{}], sending failure alert...",
                KIND,
                self.name,
                alert.pre_status,
                alert.status
            ),
            Transition::Failed { repeated: true } => log::warn!(
                "[{} / {}]: still failing, sending failure alert again...",
                KIND,
                self.name
            ),
            _ => log::info!(
                "[{} / {}]: status changed [{}] ==> [{}], sending recovery alert...",
                KIND,
                self.name,
                alert.pre_status,
                alert.status
            ),
        }

        if self.notifiers.is_empty() {
            log::warn!("[{} / {}]: no notifier configured", KIND, self.name);
        }

        for notifier in &self.notifiers {
            let res = match transition {
                Transition::Recovered => notifier.on_recover(Arc::clone(&alert)).await,
                _ => notifier.on_fail(Arc::clone(&alert)).await,
            };
            if let Err(err) = res {
                log::error!(
                    "[{} / {}]: notifier [{} / {}] returned an error: {:#}",
                    KIND,
                    self.name,
                    notifier.kind(),
                    notifier.name(),
                    err
                );
            }
        }
    }
}
