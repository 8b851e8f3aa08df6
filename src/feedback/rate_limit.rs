//! Fixed-window submission limiter keyed by client address.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const DEFAULT_RATE_LIMIT_MAX: u32 = 5;
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Allows up to `max` submissions per client within a window that starts at
/// the client's first accepted submission. Rejected attempts do not count.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records an attempt from `client` now. Returns false when over the limit.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    pub(crate) fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.lock();
        match clients.get_mut(client) {
            Some(w) if now.saturating_duration_since(w.started) <= self.window => {
                if w.count >= self.max {
                    return false;
                }
                w.count += 1;
                true
            }
            _ => {
                let window = self.window;
                clients.retain(|_, w| now.saturating_duration_since(w.started) <= window);
                clients.insert(
                    client.to_string(),
                    Window {
                        started: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
