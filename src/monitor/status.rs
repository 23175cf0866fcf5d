use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Healthy,
    Failed,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Status {
    pub fn title(&self) -> &str {
        match self {
            Status::Healthy => "Recovery",
            Status::Failed => "Failure",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Healthy => "healthy",
            Status::Failed => "failed",
        }
    }

    pub fn emoji(&self) -> &str {
        match self {
            Status::Healthy => "✅",
            Status::Failed => "❌",
        }
    }
}
