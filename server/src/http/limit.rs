use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Window applied ahead of all routes.
pub const WINDOW: Duration = Duration::from_secs(15 * 60);
/// Requests allowed per client within one window.
pub const MAX_REQUESTS: u32 = 100;

/// Fixed-window request limiter keyed by client IP.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<HashMap<IpAddr, ClientWindow>>,
}

struct ClientWindow {
    opened: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count a request against the client's current window. Returns false
    /// when the client is over the cap.
    pub fn allow(&self, client: IpAddr) -> bool {
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(_) => return true,
        };
        let now = Instant::now();
        // Sweep expired windows so the map stays bounded by currently
        // active clients; this also opens a fresh window for a returning
        // client.
        let window_len = self.window;
        clients.retain(|_, window| now.duration_since(window.opened) < window_len);
        let window = clients.entry(client).or_insert(ClientWindow {
            opened: now,
            count: 0,
        });
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients.lock().map(|clients| clients.len()).unwrap_or(0)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(WINDOW, MAX_REQUESTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn client(last_octet: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last_octet))
    }

    #[test]
    fn requests_within_the_cap_are_allowed() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        for _ in 0..3 {
            assert!(limiter.allow(client(1)));
        }
    }

    #[test]
    fn requests_past_the_cap_are_denied() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);
        assert!(limiter.allow(client(1)));
        assert!(limiter.allow(client(1)));
        assert!(!limiter.allow(client(1)));
        assert!(!limiter.allow(client(1)));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.allow(client(1)));
        assert!(!limiter.allow(client(1)));
        assert!(limiter.allow(client(2)));
    }

    #[test]
    fn a_fresh_window_resets_the_count() {
        let limiter = RateLimiter::new(Duration::from_millis(20), 1);
        assert!(limiter.allow(client(1)));
        assert!(!limiter.allow(client(1)));
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.allow(client(1)));
    }

    #[test]
    fn expired_windows_are_swept_from_the_client_map() {
        let limiter = RateLimiter::new(Duration::from_millis(20), 5);
        assert!(limiter.allow(client(1)));
        assert!(limiter.allow(client(2)));
        assert_eq!(limiter.tracked_clients(), 2);

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.allow(client(3)));
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
