use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Notifier;
use crate::{report, Alert, Format, NotifierSetting, FORMAT_FUNCS};

pub type SendFunc = Box<dyn Fn(&str, &str) -> Result<()> + Send + Sync>;

#[derive(Serialize, Deserialize, JsonSchema)]
pub struct DefaultNotifier {
    #[serde(skip)]
    pub kind: String,
    #[serde(default)]
    pub format: Format,
    #[serde(skip)]
    pub send_func: Option<SendFunc>,
    pub name: String,
    #[serde(default)]
    pub dry: bool,
}

impl std::fmt::Debug for DefaultNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultNotifier")
            .field("kind", &self.kind)
            .field("format", &self.format)
            .field("name", &self.name)
            .field("dry", &self.dry)
            .finish()
    }
}

impl DefaultNotifier {
    pub fn new(kind: &str, name: &str, format: Format) -> Self {
        Self {
            kind: kind.to_string(),
            format,
            send_func: None,
            name: name.to_string(),
            dry: false,
        }
    }

    pub fn config(&mut self, conf: &NotifierSetting) -> Result<()> {
        self.dry = self.dry || conf.dry;
        let mode = if self.dry { "Dry" } else { "Live" };
        log::info!(
            "Notification [{}] - [{}] is running on {} mode!",
            self.kind,
            self.name,
            mode,
        );
        Ok(())
    }

    pub fn render(&self, alert: Arc<Alert>) -> (String, String) {
        let title = alert.title();
        let format = FORMAT_FUNCS
            .get(&self.format)
            .or_else(|| FORMAT_FUNCS.get(&Format::Text));
        let msg = match format {
            Some(f) => (f.result_fn)(alert),
            None => title.clone(),
        };
        (title, msg)
    }

    pub fn dry_notify(&self, alert: Arc<Alert>) {
        let (_, msg) = self.render(alert);
        log::info!("[{} / {} / dry_notify] - {}", self.kind, self.name, msg);
    }

    fn send(&self, alert: Arc<Alert>, tag: &str) -> Result<()> {
        if self.dry {
            self.dry_notify(alert);
            return Ok(());
        }
        let (title, msg) = self.render(alert);
        log::debug!("[{} / {} / {}] - {}", self.kind, self.name, tag, title);
        let res = match &self.send_func {
            Some(send_func) => send_func(&title, &msg),
            None => {
                log::error!(
                    "[{} / {} / {}] - {} SendFunc is none",
                    self.kind,
                    self.name,
                    tag,
                    title
                );
                Err(anyhow!("SendFunc is none"))
            }
        };
        report::log_send(&self.kind, &self.name, tag, &title, &res);
        res
    }
}

#[async_trait]
impl Notifier for DefaultNotifier {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn on_fail(&self, alert: Arc<Alert>) -> Result<()> {
        self.send(alert, "Failure")
    }

    async fn on_recover(&self, alert: Arc<Alert>) -> Result<()> {
        self.send(alert, "Recovery")
    }
}

#[cfg(test)]
pub(crate) fn new_dummy_notifier(name: &str) -> DefaultNotifier {
    let mut n = DefaultNotifier::new("dummy", name, Format::Text);
    n.send_func = Some(Box::new(|_: &str, _: &str| -> Result<()> { Ok(()) }));
    n
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{new_dummy_alert, Status};

    #[tokio::test]
    async fn test_send_func() {
        let sent = Arc::new(Mutex::new(vec![]));
        let sink = Arc::clone(&sent);
        let mut n = DefaultNotifier::new("test", "sink", Format::Text);
        n.send_func = Some(Box::new(move |title: &str, _: &str| -> Result<()> {
            sink.lock().unwrap().push(title.to_string());
            Ok(())
        }));

        let alert = Arc::new(new_dummy_alert(Status::Failed, Status::Healthy));
        n.on_fail(alert).await.unwrap();
        let alert = Arc::new(new_dummy_alert(Status::Healthy, Status::Failed));
        n.on_recover(alert).await.unwrap();

        assert_eq!(
            *sent.lock().unwrap(),
            vec!["dummy Failure".to_string(), "dummy Recovery".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_send_func() {
        let n = DefaultNotifier::new("test", "empty", Format::Text);
        let alert = Arc::new(new_dummy_alert(Status::Failed, Status::Healthy));
        assert!(n.on_fail(alert).await.is_err());
    }

    #[tokio::test]
    async fn test_dry_mode_skips_send() {
        let mut n = DefaultNotifier::new("test", "dry", Format::JSON);
        n.send_func = Some(Box::new(|_: &str, _: &str| -> Result<()> {
            anyhow::bail!("must not be called")
        }));
        n.config(&NotifierSetting {
            dry: true,
            ..Default::default()
        })
        .unwrap();
        assert!(n.dry);

        let alert = Arc::new(new_dummy_alert(Status::Failed, Status::Healthy));
        assert!(n.on_fail(alert).await.is_ok());
    }
}
