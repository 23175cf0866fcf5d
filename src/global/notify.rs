use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{normalize, DEFAULT_NOTIFY_TIMEOUT};

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotifierSetting {
    #[serde(default)]
    pub dry: bool,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "String")]
    pub timeout: Duration,
}

impl NotifierSetting {
    pub fn normalize_timeout(&self, t: Duration) -> Duration {
        normalize(self.timeout, t, Duration::ZERO, DEFAULT_NOTIFY_TIMEOUT)
    }
}
