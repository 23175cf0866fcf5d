use super::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Steady,
    // `repeated` when the threshold is crossed again while already failed
    Failed { repeated: bool },
    Recovered,
}

#[derive(Debug, Clone)]
pub struct Health {
    status: Status,
    consecutive_failures: u32,
    fail_threshold: u32,
}

impl Health {
    // a threshold of 0 behaves like 1
    pub fn new(fail_threshold: u32) -> Self {
        Self {
            status: Status::Healthy,
            consecutive_failures: 0,
            fail_threshold: fail_threshold.max(1),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_success(&mut self) -> Transition {
        let previous = self.status;
        self.consecutive_failures = 0;
        self.status = Status::Healthy;
        if previous == Status::Failed {
            Transition::Recovered
        } else {
            Transition::Steady
        }
    }

    pub fn record_failure(&mut self) -> Transition {
        self.consecutive_failures += 1;
        if self.consecutive_failures < self.fail_threshold {
            return Transition::Steady;
        }
        let repeated = self.status == Status::Failed;
        self.consecutive_failures = 0;
        self.status = Status::Failed;
        Transition::Failed { repeated }
    }
}
