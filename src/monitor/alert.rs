use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::Status;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alert {
    pub name: String,
    pub target: String,
    pub kind: String,
    pub status: Status,
    pub pre_status: Status,
    pub failures: u32,
    pub message: String,
    pub time: DateTime<Local>,
}

impl Alert {
    pub fn title(&self) -> String {
        match self.status {
            Status::Failed if self.pre_status == Status::Failed => {
                format!("{} Still Failing", self.name)
            }
            Status::Failed => format!("{} Failure", self.name),
            Status::Healthy => format!("{} Recovery", self.name),
        }
    }
}

#[cfg(test)]
pub(crate) fn new_dummy_alert(status: Status, pre_status: Status) -> Alert {
    Alert {
        name: "dummy".to_string(),
        target: "http://localhost:8080".to_string(),
        kind: "http".to_string(),
        status,
        pre_status,
        failures: 1,
        message: "connection refused".to_string(),
        time: Local::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        let a = new_dummy_alert(Status::Failed, Status::Healthy);
        assert_eq!(a.title(), "dummy Failure");
        let a = new_dummy_alert(Status::Failed, Status::Failed);
        assert_eq!(a.title(), "dummy Still Failing");
        let a = new_dummy_alert(Status::Healthy, Status::Failed);
        assert_eq!(a.title(), "dummy Recovery");
    }
}
