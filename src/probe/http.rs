use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};

use super::Prober;

const KIND: &str = "http";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HttpOptions {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default = "default_success_codes")]
    pub success_codes: Vec<(u16, u16)>,
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            method: default_method(),
            headers: HashMap::new(),
            body: None,
            success_codes: default_success_codes(),
            proxy: None,
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_success_codes() -> Vec<(u16, u16)> {
    vec![(0, 499)]
}

#[derive(Debug)]
pub struct HttpProber {
    method: Method,
    options: HttpOptions,
    client: Client,
}

impl HttpProber {
    pub fn new(options: HttpOptions, timeout: Duration) -> Result<Self> {
        let method = options.method.to_uppercase().parse::<Method>()?;

        let mut client_builder = Client::builder();
        if !timeout.is_zero() {
            client_builder = client_builder.timeout(timeout);
        }

        // proxy server
        if let Some(proxy_url) = &options.proxy {
            if let Err(err) = Url::parse(proxy_url) {
                log::error!("[{}] proxy URL is not valid - {} url={}", KIND, err, proxy_url);
                bail!(err)
            }
            client_builder = client_builder.proxy(reqwest::Proxy::http(proxy_url.trim())?);
            log::debug!("[{}] proxy server is {}", KIND, proxy_url);
        }

        Ok(Self {
            method,
            options,
            client: client_builder.build()?,
        })
    }

    fn is_success(&self, code: u16) -> bool {
        self.options
            .success_codes
            .iter()
            .any(|&(start, end)| start <= code && code <= end)
    }
}

#[async_trait]
impl Prober for HttpProber {
    fn kind(&self) -> &str {
        KIND
    }

    async fn probe(&self, target: &str) -> Result<()> {
        let url = Url::parse(target)?;
        let mut request = self.client.request(self.method.clone(), url);
        for (k, v) in &self.options.headers {
            request = request.header(k, v);
        }
        if let Some(body) = &self.options.body {
            request = request.body(body.clone());
        }

        let status = request.send().await?.status();
        if !self.is_success(status.as_u16()) {
            bail!(
                "HTTP Status Code is {}. It missed in {:?}",
                status,
                self.options.success_codes
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn test_success_codes() {
        let p = HttpProber::new(
            HttpOptions {
                success_codes: vec![(200, 299), (304, 304)],
                ..Default::default()
            },
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(p.is_success(200));
        assert!(p.is_success(304));
        assert!(!p.is_success(301));
        assert!(!p.is_success(500));

        let p = HttpProber::new(HttpOptions::default(), Duration::from_secs(1)).unwrap();
        assert!(p.is_success(404));
        assert!(!p.is_success(503));
    }

    #[test]
    fn test_bad_options() {
        let res = HttpProber::new(
            HttpOptions {
                proxy: Some("not a url".to_string()),
                ..Default::default()
            },
            Duration::ZERO,
        );
        assert!(res.is_err());

        let res = HttpProber::new(
            HttpOptions {
                method: "NOT A METHOD".to_string(),
                ..Default::default()
            },
            Duration::ZERO,
        );
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_invalid_target() {
        let p = HttpProber::new(HttpOptions::default(), Duration::from_secs(1)).unwrap();
        assert!(p.probe("not a url").await.is_err());
    }

    #[tokio::test]
    async fn test_request_timeout() {
        // accepts connections and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut conns = vec![];
            while let Ok((conn, _)) = listener.accept().await {
                conns.push(conn);
            }
        });

        let p = HttpProber::new(HttpOptions::default(), Duration::from_millis(200)).unwrap();
        let res = tokio::time::timeout(
            Duration::from_secs(5),
            p.probe(&format!("http://{}/", addr)),
        )
        .await
        .expect("the client timeout should end the request");
        assert!(res.is_err());

        server.abort();
    }
}
