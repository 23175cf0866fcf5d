use anyhow::{bail, Context, Result};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, sync::Arc, time::Duration};

use reqwest::Url;

use crate::{
    global::{MonitorDefaults, NotifierSetting},
    notify, HttpOptions, HttpProber, MonitorSettings, Prober, TcpProber,
};

pub fn json_schema() -> Result<String> {
    let schema = schema_for!(Conf);
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    #[default]
    Http,
    Tcp,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonitorConf {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub kind: ProbeKind,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "String")]
    pub period: Duration,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub sleep: Option<Duration>,
    #[serde(default)]
    pub fails: u32,
    // empty means every notifier
    #[serde(default)]
    pub notify: Vec<String>,
    #[serde(default)]
    pub http: HttpOptions,
}

impl MonitorConf {
    pub fn settings(&self, defaults: &MonitorDefaults) -> MonitorSettings {
        MonitorSettings {
            timeout: defaults.normalize_timeout(self.timeout),
            period: defaults.normalize_period(self.period),
            sleep: defaults.normalize_sleep(self.sleep),
            fail_threshold: defaults.normalize_fails(self.fails),
        }
    }

    pub fn prober(&self, timeout: Duration) -> Result<Arc<dyn Prober>> {
        let prober: Arc<dyn Prober> = match self.kind {
            ProbeKind::Http => {
                let url = Url::parse(&self.url)
                    .with_context(|| format!("bad url {} for monitor {}", self.url, self.name))?;
                if !matches!(url.scheme(), "http" | "https") {
                    bail!("bad url {} for monitor {}: not http(s)", self.url, self.name);
                }
                Arc::new(
                    HttpProber::new(self.http.clone(), timeout)
                        .with_context(|| format!("bad http options for monitor {}", self.name))?,
                )
            }
            ProbeKind::Tcp => Arc::new(TcpProber),
        };
        Ok(prober)
    }
}

// Global Settings
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub monitor: MonitorDefaults,
    #[serde(default)]
    pub notify: NotifierSetting,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: default_name(),
            log: Default::default(),
            monitor: Default::default(),
            notify: Default::default(),
        }
    }
}

fn default_name() -> String {
    "monlite".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// `level` filters stderr; the file gets `file_level`, or `level` when unset.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub file_level: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            file_level: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Conf {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub monitor: Vec<MonitorConf>,
    #[serde(default)]
    pub notify: notify::Config,
}

impl Conf {
    pub fn from_yaml(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        Self::from_yaml(&s)
            .with_context(|| format!("failed to parse configuration file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global::DEFAULT_PERIOD;

    const CONF: &str = r#"
settings:
  log:
    level: warn
    file: /var/log/monlite/monlite.log
    file_level: debug
  monitor:
    timeout: 3s
    sleep: 5m
    fails: 2
  notify:
    dry: true
monitor:
  - name: web
    url: https://example.com/health
    period: 30s
    fails: 4
    notify: [ops]
    http:
      method: HEAD
      success_codes: [[200, 299]]
  - name: db
    kind: tcp
    url: tcp://127.0.0.1:5432
notify:
  log:
    - name: ops
      file: /tmp/monlite-alerts.log
  webhook:
    - name: chat
      url: https://hooks.example.com/x
      format: json
      timeout: 5s
"#;

    #[test]
    fn test_parse() {
        let c = Conf::from_yaml(CONF).unwrap();
        assert_eq!(c.settings.name, "monlite");
        assert_eq!(c.settings.log.level, "warn");
        assert_eq!(c.settings.log.file.as_deref(), Some("/var/log/monlite/monlite.log"));
        assert_eq!(c.settings.log.file_level.as_deref(), Some("debug"));
        assert!(c.settings.notify.dry);
        assert_eq!(c.monitor.len(), 2);
        assert_eq!(c.notify.log.len(), 1);
        assert_eq!(c.notify.webhook.len(), 1);

        let web = &c.monitor[0];
        assert_eq!(web.kind, ProbeKind::Http);
        assert_eq!(web.notify, vec!["ops".to_string()]);
        assert_eq!(web.http.method, "HEAD");
        let s = web.settings(&c.settings.monitor);
        assert_eq!(s.period, Duration::from_secs(30));
        assert_eq!(s.timeout, Duration::from_secs(3));
        assert_eq!(s.sleep, Duration::from_secs(300));
        assert_eq!(s.fail_threshold, 4);

        let db = &c.monitor[1];
        assert_eq!(db.kind, ProbeKind::Tcp);
        let s = db.settings(&c.settings.monitor);
        assert_eq!(s.period, DEFAULT_PERIOD);
        assert_eq!(s.fail_threshold, 2);
        assert_eq!(db.prober(s.timeout).unwrap().kind(), "tcp");
        assert_eq!(web.prober(s.timeout).unwrap().kind(), "http");
    }

    #[test]
    fn test_explicit_zero_durations() {
        let c = Conf::from_yaml(
            r#"
settings:
  monitor: { sleep: 5m }
monitor:
  - { name: web, url: "https://example.com", sleep: 0s }
  - { name: api, url: "https://example.com/api" }
"#,
        )
        .unwrap();
        let s = c.monitor[0].settings(&c.settings.monitor);
        assert_eq!(s.sleep, Duration::ZERO);
        let s = c.monitor[1].settings(&c.settings.monitor);
        assert_eq!(s.sleep, Duration::from_secs(300));
    }

    #[test]
    fn test_http_target_must_be_url() {
        let c = Conf::from_yaml("monitor: [{name: web, url: \"example.com:80\"}]").unwrap();
        let err = c.monitor[0].prober(Duration::from_secs(1)).err().unwrap();
        assert!(err.to_string().contains("bad url example.com:80"));

        let c = Conf::from_yaml("monitor: [{name: web, url: \"127.0.0.1:80\"}]").unwrap();
        assert!(c.monitor[0].prober(Duration::from_secs(1)).is_err());

        let c = Conf::from_yaml("monitor: [{name: db, url: \"example.com:5432\", kind: tcp}]")
            .unwrap();
        assert!(c.monitor[0].prober(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_empty() {
        let c = Conf::from_yaml("{}").unwrap();
        assert_eq!(c.settings.log.level, "info");
        assert!(c.settings.log.file.is_none());
        assert!(c.monitor.is_empty());
    }

    #[test]
    fn test_bad_duration() {
        let res = Conf::from_yaml("monitor: [{name: a, url: b, period: soon}]");
        assert!(res.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Conf::load("/nonexistent/monlite.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/monlite.yaml"));
    }

    #[test]
    fn test_json_schema() {
        let schema = json_schema().unwrap();
        assert!(schema.contains("MonitorConf"));
    }
}
