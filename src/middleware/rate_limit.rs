//! Per-client rate limiting.
//!
//! Each client IP gets its own token bucket, created on first sight and
//! evicted again once the client has been idle long enough. The bucket math
//! comes from `governor`; the registry, its locking, and the sweep lifecycle
//! are owned here.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reelvault_config::RateLimitConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::AppState;
use crate::utils::errors::AppError;

/// How often the background sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Entries idle for longer than this are dropped by the sweep.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(180);

struct ClientLimiter {
    bucket: DefaultDirectRateLimiter,
    last_seen: Instant,
}

/// One token bucket per client.
///
/// The map lock covers lookup, insert, and token consumption as a single
/// atomic unit, so two first requests from the same client cannot race a
/// duplicate entry into existence and a sweep can never evict an entry while
/// a request is consuming from it.
pub struct LimiterRegistry {
    config: RateLimitConfig,
    clients: Mutex<HashMap<IpAddr, ClientLimiter>>,
}

impl LimiterRegistry {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.config.burst).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }

    /// Attempts to consume one token from `client`'s bucket, creating the
    /// bucket if this client has not been seen before.
    pub fn allow(&self, client: IpAddr) -> bool {
        let mut clients = self.clients.lock().expect("limiter registry lock poisoned");

        let entry = clients.entry(client).or_insert_with(|| ClientLimiter {
            bucket: RateLimiter::direct(self.quota()),
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        entry.bucket.check().is_ok()
    }

    /// Drops every entry idle for longer than `idle_threshold`. Each entry's
    /// removal decision is independent and idempotent, so a sweep interrupted
    /// by shutdown leaves the registry in a valid state.
    pub fn sweep(&self, idle_threshold: Duration) {
        let mut clients = self.clients.lock().expect("limiter registry lock poisoned");
        clients.retain(|_, entry| entry.last_seen.elapsed() <= idle_threshold);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.clients
            .lock()
            .expect("limiter registry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs [`LimiterRegistry::sweep`] once per [`SWEEP_INTERVAL`] until the
    /// shutdown flag flips.
    pub fn spawn_sweeper(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            // The first tick completes immediately; skip it so the first
            // sweep happens one full interval in.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.sweep(IDLE_THRESHOLD),
                    _ = shutdown.changed() => break,
                }
            }
        })
    }
}

/// The key a client is limited under: the first `X-Forwarded-For` hop when
/// present (the API normally sits behind a proxy), else the peer address.
fn client_ip(req: &Request) -> IpAddr {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
        })
}

/// 429s clients that have exhausted their bucket; everything else passes
/// through untouched. When disabled by configuration no registry entries are
/// ever created.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.rate_limit_config.enabled {
        return next.run(req).await;
    }

    if !state.limiter.allow(client_ip(&req)) {
        return AppError::rate_limit_exceeded().into_response();
    }

    next.run(req).await
}
