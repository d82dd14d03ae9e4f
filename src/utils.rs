//! Shared utilities.

use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current time in milliseconds since UNIX epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_positive() {
        let now = now_ms();
        assert!(now > 0);
    }
}
