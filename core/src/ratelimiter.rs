//! Sliding-window admission limiter keyed by client identity.
//!
//! Strictly count-in-window: each admitted request records a timestamp, and a
//! request is rejected when the surviving count in the window has reached the
//! limit. State is process-local and guarded independently of the job
//! registry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_LIMIT: usize = 10;

pub struct RateLimiter {
    window: Duration,
    limit: usize,
    clients: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: usize) -> Self {
        Self::with_window(limit, DEFAULT_WINDOW)
    }

    pub fn with_window(limit: usize, window: Duration) -> Self {
        Self { window, limit, clients: Mutex::new(HashMap::new()) }
    }

    /// Admit or reject a request from `client` at the current instant.
    /// Rejected requests are not recorded.
    pub fn admit(&self, client: &str) -> bool {
        self.admit_at(client, Instant::now())
    }

    /// Clock-injected variant of [`admit`](Self::admit); `now` must not move
    /// backwards for a given client.
    pub fn admit_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap();
        let stamps = clients.entry(client.to_string()).or_default();
        stamps.retain(|&t| now.duration_since(t) < self.window);
        if stamps.len() >= self.limit {
            return false;
        }
        stamps.push(now);
        true
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleventh_request_in_window_is_rejected() {
        let rl = RateLimiter::new(10);
        let base = Instant::now();
        for i in 0..10 {
            assert!(rl.admit_at("client-a", base + Duration::from_secs(i)));
        }
        assert!(!rl.admit_at("client-a", base + Duration::from_secs(10)));
    }

    #[test]
    fn window_expires_and_admission_resumes() {
        let rl = RateLimiter::new(10);
        let base = Instant::now();
        for _ in 0..10 {
            assert!(rl.admit_at("client-a", base));
        }
        assert!(!rl.admit_at("client-a", base + Duration::from_secs(30)));
        assert!(rl.admit_at("client-a", base + Duration::from_secs(61)));
    }

    #[test]
    fn clients_are_tracked_independently() {
        let rl = RateLimiter::new(1);
        let base = Instant::now();
        assert!(rl.admit_at("client-a", base));
        assert!(!rl.admit_at("client-a", base));
        assert!(rl.admit_at("client-b", base));
    }

    #[test]
    fn rejected_requests_do_not_extend_the_window() {
        let rl = RateLimiter::new(1);
        let base = Instant::now();
        assert!(rl.admit_at("client-a", base));
        for i in 1..60 {
            assert!(!rl.admit_at("client-a", base + Duration::from_secs(i)));
        }
        assert!(rl.admit_at("client-a", base + Duration::from_secs(60)));
    }
}
