//! Single-shot debouncer driven by the caller's clock.
//!
//! The UI loop calls [`Debouncer::arm`] on every input change and
//! [`Debouncer::poll`] on every tick. Arming replaces whatever was pending,
//! so a superseded payload can never fire.

use std::time::{Duration, Instant};

/// Quiet period before a search is triggered.
pub const SEARCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `payload` to fire `delay` after `now`, dropping anything
    /// already pending. Returns `true` if a pending payload was superseded.
    pub fn arm(&mut self, payload: T, now: Instant) -> bool {
        self.pending
            .replace(Pending {
                payload,
                deadline: now + self.delay,
            })
            .is_some()
    }

    /// Drop the pending payload, if any.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Take the payload once its deadline has passed. Fires at most once
    /// per `arm`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|p| p.payload)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(SEARCH_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn rapid_keystrokes_fire_once_with_the_latest_payload() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(ms(1000));
        let mut fired = Vec::new();

        let keystrokes = [(0, "r", 300), (200, "ru", 310), (400, "rus", 320)];
        let mut ks = keystrokes.iter().peekable();

        // Step a simulated clock every 10 ms through 3 s.
        for tick in (0..=3000).step_by(10) {
            while let Some((at, text, size)) = ks.peek() {
                if *at > tick {
                    break;
                }
                debouncer.arm((text.to_string(), *size), t0 + ms(*at));
                ks.next();
            }
            if let Some(payload) = debouncer.poll(t0 + ms(tick)) {
                fired.push((tick, payload));
            }
        }

        assert_eq!(fired, vec![(1400, ("rus".to_string(), 320))]);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn arming_reports_superseded_payloads() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(ms(50));
        assert!(!debouncer.arm(1, now));
        assert!(debouncer.arm(2, now + ms(10)));
        assert_eq!(debouncer.deadline(), Some(now + ms(60)));
        assert_eq!(debouncer.poll(now + ms(59)), None);
        assert_eq!(debouncer.poll(now + ms(60)), Some(2));
        assert_eq!(debouncer.poll(now + ms(500)), None);
    }

    #[test]
    fn cancelled_payload_never_fires() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(ms(100));
        debouncer.arm("x", now);
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert_eq!(debouncer.poll(now + ms(1000)), None);
    }

    #[test]
    fn default_delay_is_one_second() {
        let debouncer: Debouncer<()> = Debouncer::default();
        assert_eq!(debouncer.delay(), ms(1000));
    }
}
