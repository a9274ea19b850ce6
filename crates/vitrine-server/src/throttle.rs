//! Admission control for storage-request submissions.
//!
//! Each client address may file a bounded number of requests per window,
//! and the same email asking for the same image twice within the window is
//! refused as a duplicate. Old entries are dropped as new submissions come
//! in, so memory follows recent traffic only.

use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};
use tracing::{debug, warn};

use vitrine_shared::ValidStorageRequest;

use crate::error::ServerError;

#[derive(Default)]
struct Ledger {
    /// Accepted submission times per client, oldest first.
    by_client: HashMap<IpAddr, VecDeque<Instant>>,
    /// Last acceptance of each (email, image code) pair.
    by_request: HashMap<(String, String), Instant>,
    last_sweep: Option<Instant>,
}

impl Ledger {
    fn sweep(&mut self, now: Instant, window: Duration) {
        let due = self
            .last_sweep
            .map_or(true, |at| now.duration_since(at) >= window);
        if !due {
            return;
        }

        self.by_client.retain(|_, times| {
            expire(times, now, window);
            !times.is_empty()
        });
        self.by_request.retain(|_, at| now.duration_since(*at) < window);
        self.last_sweep = Some(now);
    }
}

fn expire(times: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while times
        .front()
        .is_some_and(|at| now.duration_since(*at) >= window)
    {
        times.pop_front();
    }
}

#[derive(Clone)]
pub struct SubmissionThrottle {
    ledger: Arc<Mutex<Ledger>>,
    per_client: usize,
    window: Duration,
}

impl SubmissionThrottle {
    /// At most `per_client` submissions per client address in any `window`.
    pub fn new(per_client: usize, window: Duration) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Ledger::default())),
            per_client,
            window,
        }
    }

    /// Record `form` from `client` if it may go through. Nothing is recorded
    /// for a refused submission.
    pub fn admit(
        &self,
        client: Option<IpAddr>,
        form: &ValidStorageRequest,
    ) -> Result<(), ServerError> {
        self.admit_at(client, form, Instant::now())
    }

    fn admit_at(
        &self,
        client: Option<IpAddr>,
        form: &ValidStorageRequest,
        now: Instant,
    ) -> Result<(), ServerError> {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger.sweep(now, self.window);

        let key = (form.email.clone(), form.image_code.to_lowercase());
        if let Some(at) = ledger.by_request.get(&key) {
            if now.duration_since(*at) < self.window {
                debug!(code = %form.image_code, "duplicate storage request");
                return Err(ServerError::DuplicateRequest);
            }
        }

        if let Some(ip) = client {
            let times = ledger.by_client.entry(ip).or_default();
            expire(times, now, self.window);
            if times.len() >= self.per_client {
                warn!(%ip, "storage request limit reached");
                return Err(ServerError::RateLimited);
            }
            times.push_back(now);
        }

        ledger.by_request.insert(key, now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_client
            .len()
    }
}

/// The submitting client's address: the socket peer when known, otherwise
/// the first `X-Forwarded-For` hop, otherwise `X-Real-IP`.
pub fn client_ip(extensions: &Extensions, headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(ConnectInfo(addr)) = extensions.get::<ConnectInfo<SocketAddr>>() {
        return Some(addr.ip());
    }

    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for").or_else(|| header_ip("x-real-ip"))
}
