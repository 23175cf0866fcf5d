use std::time::Duration;

mod monitor;
pub use monitor::*;
mod notify;
pub use notify::*;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(600);
pub const DEFAULT_FAIL_THRESHOLD: u32 = 1;
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

pub fn normalize<T: PartialEq + Copy>(global: T, local: T, invalid: T, default: T) -> T {
    if local != invalid {
        return local;
    }
    if global != invalid {
        return global;
    }
    default
}

pub fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0, 5, 0, 9), 5);
        assert_eq!(normalize(3, 0, 0, 9), 3);
        assert_eq!(normalize(0, 0, 0, 9), 9);
        assert_eq!(
            normalize(Duration::ZERO, Duration::ZERO, Duration::ZERO, DEFAULT_SLEEP),
            DEFAULT_SLEEP
        );
    }

    #[test]
    fn test_get_env_or_default() {
        assert_eq!(
            get_env_or_default("MONLITE_SURELY_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
