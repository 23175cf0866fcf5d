use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{EmailNotifier, LogNotifier, WebhookNotifier};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub log: Vec<LogNotifier>,
    #[serde(default)]
    pub webhook: Vec<WebhookNotifier>,
    #[serde(default)]
    pub email: Vec<EmailNotifier>,
}
