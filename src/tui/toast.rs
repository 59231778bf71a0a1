use std::time::{Duration, Instant};

/// Short-lived message shown in the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

impl Toast {
    pub fn new(message: impl Into<String>, duration: Duration, now: Instant) -> Self {
        Self {
            message: message.into(),
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_its_duration() {
        let now = Instant::now();
        let toast = Toast::new("boom", Duration::from_secs(2), now);
        assert!(!toast.is_expired(now + Duration::from_millis(1999)));
        assert!(toast.is_expired(now + Duration::from_secs(2)));
    }
}
