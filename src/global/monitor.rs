use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{
    normalize, DEFAULT_FAIL_THRESHOLD, DEFAULT_PERIOD, DEFAULT_SLEEP, DEFAULT_TIMEOUT,
};

// `timeout` and `sleep` are optional because zero is a meaningful value for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonitorDefaults {
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
}

impl MonitorDefaults {
    pub fn normalize_timeout(&self, t: Option<Duration>) -> Duration {
        t.or(self.timeout).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn normalize_period(&self, t: Duration) -> Duration {
        normalize(self.period, t, Duration::ZERO, DEFAULT_PERIOD)
    }

    pub fn normalize_sleep(&self, t: Option<Duration>) -> Duration {
        t.or(self.sleep).unwrap_or(DEFAULT_SLEEP)
    }

    pub fn normalize_fails(&self, fails: u32) -> u32 {
        normalize(self.fails, fails, 0, DEFAULT_FAIL_THRESHOLD)
    }
}
