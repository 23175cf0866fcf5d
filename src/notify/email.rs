use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{authentication::Credentials, extension::ClientId},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{DefaultNotifier, Notifier};
use crate::{report, Alert, NotifierSetting};

const KIND: &str = "email";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    #[default]
    Starttls,
    Tls,
    None,
}

#[derive(Serialize, Deserialize, JsonSchema)]
pub struct EmailNotifier {
    #[serde(flatten)]
    default: DefaultNotifier,
    // host or host:port
    server: String,
    #[serde(default)]
    security: SmtpSecurity,
    #[serde(default)]
    account: String,
    #[serde(default, skip_serializing)]
    password: String,
    #[serde(default)]
    helo: Option<String>,
    from: String,
    to: Vec<String>,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "String")]
    timeout: Duration,
    #[serde(skip)]
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("default", &self.default)
            .field("server", &self.server)
            .field("security", &self.security)
            .field("account", &self.account)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn split_server(server: &str) -> Result<(&str, Option<u16>)> {
    match server.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .with_context(|| format!("invalid port in smtp server {}", server))?;
            Ok((host, Some(port)))
        }
        None => Ok((server, None)),
    }
}

impl EmailNotifier {
    pub fn new(name: &str, server: &str, from: &str, to: &[&str]) -> Self {
        Self {
            default: DefaultNotifier::new(KIND, name, Default::default()),
            server: server.to_string(),
            security: SmtpSecurity::default(),
            account: String::new(),
            password: String::new(),
            helo: None,
            from: from.to_string(),
            to: to.iter().map(|s| s.to_string()).collect(),
            timeout: Duration::ZERO,
            mailer: None,
        }
    }

    pub fn config(&mut self, g_conf: &NotifierSetting) -> Result<()> {
        self.default.kind = KIND.to_string();
        self.default.config(g_conf)?;

        // fail on bad addresses at startup, not on the first alert
        self.message("check", String::new())
            .with_context(|| format!("[{} / {}] bad mail addresses", KIND, self.default.name))?;

        let (host, port) = split_server(&self.server)?;
        if host.is_empty() {
            bail!("[{} / {}] smtp server is empty", KIND, self.default.name);
        }
        let mut builder = match self.security {
            SmtpSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        };
        if let Some(port) = port {
            builder = builder.port(port);
        }
        if !self.account.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.account.clone(),
                self.password.clone(),
            ));
        }
        if let Some(helo) = &self.helo {
            builder = builder.hello_name(ClientId::Domain(helo.clone()));
        }

        self.timeout = g_conf.normalize_timeout(self.timeout);
        self.mailer = Some(builder.timeout(Some(self.timeout)).build());
        log::debug!(
            "[{} / {}] smtp server {} ({:?})",
            KIND,
            self.default.name,
            self.server,
            self.security
        );
        Ok(())
    }

    fn message(&self, title: &str, body: String) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.parse::<Mailbox>()?)
            .subject(title)
            .header(ContentType::TEXT_PLAIN);
        if self.to.is_empty() {
            bail!("no recipient");
        }
        for to in &self.to {
            builder = builder.to(to.parse::<Mailbox>()?);
        }
        Ok(builder.body(body)?)
    }

    async fn send(&self, alert: Arc<Alert>, tag: &str) -> Result<()> {
        if self.default.dry {
            self.default.dry_notify(alert);
            return Ok(());
        }
        let Some(mailer) = &self.mailer else {
            bail!("[{} / {}] not configured", KIND, self.default.name);
        };

        let (title, text) = self.default.render(alert);
        let res = async {
            let message = self.message(&title, text)?;
            mailer.send(message).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;
        report::log_send(KIND, &self.default.name, tag, &title, &res);
        res
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn kind(&self) -> &str {
        KIND
    }

    fn name(&self) -> &str {
        &self.default.name
    }

    async fn on_fail(&self, alert: Arc<Alert>) -> Result<()> {
        self.send(alert, "Failure").await
    }

    async fn on_recover(&self, alert: Arc<Alert>) -> Result<()> {
        self.send(alert, "Recovery").await
    }
}
