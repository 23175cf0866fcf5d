use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{DefaultNotifier, Notifier};
use crate::{report, Alert, NotifierSetting};

const KIND: &str = "webhook";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WebhookNotifier {
    #[serde(flatten)]
    default: DefaultNotifier,
    url: String,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "String")]
    timeout: Duration,
    #[serde(skip)]
    client: Option<Client>,
}

impl WebhookNotifier {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            default: DefaultNotifier::new(KIND, name, Default::default()),
            url: url.to_string(),
            timeout: Duration::ZERO,
            client: None,
        }
    }

    pub fn config(&mut self, g_conf: &NotifierSetting) -> Result<()> {
        self.default.kind = KIND.to_string();
        self.default.config(g_conf)?;

        if let Err(err) = Url::parse(&self.url) {
            log::error!(
                "[{} / {}] URL is not valid - {} url={}",
                KIND,
                self.default.name,
                err,
                self.url
            );
            bail!(err)
        }

        self.timeout = g_conf.normalize_timeout(self.timeout);
        self.client = Some(Client::builder().timeout(self.timeout).build()?);
        Ok(())
    }

    async fn post(&self, alert: Arc<Alert>, tag: &str) -> Result<()> {
        if self.default.dry {
            self.default.dry_notify(alert);
            return Ok(());
        }
        let Some(client) = &self.client else {
            bail!("[{} / {}] not configured", KIND, self.default.name);
        };

        let (title, text) = self.default.render(Arc::clone(&alert));
        let payload = serde_json::json!({
            "title": title,
            "text": text,
            "alert": alert.as_ref(),
        });

        let res = async {
            let resp = client.post(&self.url).json(&payload).send().await?;
            resp.error_for_status()?;
            Ok::<(), anyhow::Error>(())
        }
        .await;
        report::log_send(KIND, &self.default.name, tag, &title, &res);
        res
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn kind(&self) -> &str {
        KIND
    }

    fn name(&self) -> &str {
        &self.default.name
    }

    async fn on_fail(&self, alert: Arc<Alert>) -> Result<()> {
        self.post(alert, "Failure").await
    }

    async fn on_recover(&self, alert: Arc<Alert>) -> Result<()> {
        self.post(alert, "Recovery").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{new_dummy_alert, Status};

    #[test]
    fn test_config() {
        let mut n = WebhookNotifier::new("chat", "not a url");
        assert!(n.config(&NotifierSetting::default()).is_err());

        let mut n = WebhookNotifier::new("chat", "http://127.0.0.1:9/hook");
        n.config(&NotifierSetting::default()).unwrap();
        assert_eq!(n.timeout, crate::global::DEFAULT_NOTIFY_TIMEOUT);
        assert!(n.client.is_some());
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let n = WebhookNotifier::new("chat", "http://127.0.0.1:9/hook");
        let alert = Arc::new(new_dummy_alert(Status::Failed, Status::Healthy));
        assert!(n.on_fail(alert).await.is_err());
    }
}
