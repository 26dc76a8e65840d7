//! API key authentication and per-caller rate limiting.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

/// Header carrying the acting user. Logged, never used as a limiter key.
pub const ACTOR_HEADER: &str = "X-Actor-Id";

#[derive(Clone, Debug, Default)]
pub struct SecurityConfig {
    pub api_key: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub rate_limiter: Option<RateLimiter>,
}

impl SecurityConfig {
    /// No authentication and no rate limiting (local use and tests).
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn with_rate_limit(max_requests: u32) -> Self {
        Self {
            rate_limiter: Some(RateLimiter::new(max_requests, Duration::from_secs(60))),
            ..Self::default()
        }
    }
}

/// Sliding-window limiter keyed by client address.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    state: Arc<Mutex<Callers>>,
}

#[derive(Debug)]
struct Callers {
    requests: HashMap<String, Vec<Instant>>,
    last_sweep: Instant,
}

impl Callers {
    fn sweep(&mut self, now: Instant, window: Duration) {
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&t| now.duration_since(t) < window);
            !timestamps.is_empty()
        });
        self.last_sweep = now;
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(Callers {
                requests: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    fn callers(&self) -> MutexGuard<'_, Callers> {
        // A panic while holding the lock leaves only timestamps behind.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a request from `caller`; false once the window is full.
    /// Idle callers are swept at most once per window.
    pub fn check(&self, caller: &str) -> bool {
        let now = Instant::now();
        let mut callers = self.callers();
        if now.duration_since(callers.last_sweep) >= self.window {
            callers.sweep(now, self.window);
        }

        let entry = callers.requests.entry(caller.to_string()).or_default();
        entry.retain(|&t| now.duration_since(t) < self.window);
        if entry.len() < self.max_requests as usize {
            entry.push(now);
            true
        } else {
            false
        }
    }

    /// Drop callers with no request left in the window.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.callers().sweep(now, self.window);
    }

    pub fn tracked_callers(&self) -> usize {
        self.callers().requests.len()
    }
}

pub async fn auth_middleware(
    State(config): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected_key = match &config.api_key {
        Some(key) => key,
        None => return Ok(next.run(request).await),
    };

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == expected_key => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub async fn rate_limit_middleware(
    State(rate_limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let caller = caller_key(&request);

    if rate_limiter.check(&caller) {
        Ok(next.run(request).await)
    } else {
        let actor = request
            .headers()
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        tracing::warn!(actor, "Rate limit exceeded for {}", caller);
        Err(StatusCode::TOO_MANY_REQUESTS)
    }
}

/// The client address: the socket peer when the server was started with
/// connect info, otherwise the proxy headers.
fn caller_key(request: &Request<Body>) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return format!("ip:{}", addr.ip());
    }

    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    if let Some(ip) = header("X-Forwarded-For").and_then(|v| v.split(',').next()) {
        return format!("ip:{}", ip.trim());
    }
    if let Some(ip) = header("X-Real-IP") {
        return format!("ip:{ip}");
    }
    "ip:127.0.0.1".to_string()
}
