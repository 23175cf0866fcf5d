use std::{
    fs::OpenOptions,
    io::Write,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{DefaultNotifier, Notifier};
use crate::{Alert, NotifierSetting};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogNotifier {
    #[serde(flatten)]
    default: DefaultNotifier,
    file: String,
}

impl LogNotifier {
    pub fn new(name: &str, file: &str) -> Self {
        Self {
            default: DefaultNotifier::new("log", name, Default::default()),
            file: file.to_string(),
        }
    }

    pub fn config(&mut self, g_conf: &NotifierSetting) -> Result<()> {
        if self.default.kind.is_empty() {
            self.default.kind = "log".to_string();
        }

        self.default.config(g_conf)?;

        if self.file.is_empty() {
            return Err(anyhow!(
                "[{} / {}] file must not be empty",
                self.default.kind,
                self.default.name
            ));
        }

        let log_target = Arc::new(Mutex::new(
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(&self.file)
                .map_err(|e| anyhow!("Failed to open log file {}: {}", self.file, e))?,
        ));
        let send_fn = move |title: &str, msg: &str| -> Result<()> {
            let mut file = log_target
                .lock()
                .map_err(|_| anyhow!("log file lock poisoned"))?;
            writeln!(file, "Notification: {}", title)?;
            for line in msg.lines() {
                writeln!(file, "{}", line)?;
            }
            file.flush()?;
            Ok(())
        };
        self.default.send_func = Some(Box::new(send_fn));

        Ok(())
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn kind(&self) -> &str {
        self.default.kind()
    }

    fn name(&self) -> &str {
        self.default.name()
    }

    async fn on_fail(&self, alert: Arc<Alert>) -> Result<()> {
        self.default.on_fail(alert).await
    }

    async fn on_recover(&self, alert: Arc<Alert>) -> Result<()> {
        self.default.on_recover(alert).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{new_dummy_alert, Status};

    #[tokio::test]
    async fn test_log_notifier() {
        let path = std::env::temp_dir().join(format!("monlite-log-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut n = LogNotifier::new("file", path.to_str().unwrap());
        n.config(&NotifierSetting::default()).unwrap();
        assert_eq!(n.kind(), "log");

        n.on_fail(Arc::new(new_dummy_alert(Status::Failed, Status::Healthy)))
            .await
            .unwrap();
        n.on_recover(Arc::new(new_dummy_alert(Status::Healthy, Status::Failed)))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Notification: dummy Failure"));
        assert!(content.contains("Notification: dummy Recovery"));
        assert!(content.contains("connection refused"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_file() {
        let mut n = LogNotifier::new("file", "");
        assert!(n.config(&NotifierSetting::default()).is_err());
    }
}
