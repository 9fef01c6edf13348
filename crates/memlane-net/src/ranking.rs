//! Adaptive endpoint ranking.
//!
//! Endpoints are ordered by consecutive failures, then smoothed latency, then
//! configured order. Health lives for the process lifetime only.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

/// Weight of the newest sample in the latency average.
const LATENCY_ALPHA: f64 = 0.3;

/// Observed health of one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointHealth {
    pub url: String,
    /// Position in the configured list; the final tie-breaker.
    pub order: usize,
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    /// Exponentially weighted latency of successful calls.
    pub avg_latency_ms: Option<f64>,
}

impl EndpointHealth {
    fn new(url: String, order: usize) -> Self {
        Self {
            url,
            order,
            successes: 0,
            failures: 0,
            consecutive_failures: 0,
            avg_latency_ms: None,
        }
    }
}

#[derive(Debug)]
pub struct EndpointRanking {
    endpoints: Mutex<Vec<EndpointHealth>>,
}

impl EndpointRanking {
    pub fn new(urls: impl IntoIterator<Item = String>) -> Self {
        let endpoints = urls
            .into_iter()
            .filter(|u| !u.trim().is_empty())
            .enumerate()
            .map(|(order, url)| EndpointHealth::new(url, order))
            .collect();
        Self {
            endpoints: Mutex::new(endpoints),
        }
    }

    // Counters only; a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<EndpointHealth>> {
        self.endpoints.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// URLs in the order they should be tried.
    pub fn ranked(&self) -> Vec<String> {
        let mut endpoints = self.lock().clone();
        endpoints.sort_by(|a, b| {
            a.consecutive_failures
                .cmp(&b.consecutive_failures)
                .then_with(|| {
                    let la = a.avg_latency_ms.unwrap_or(0.0);
                    let lb = b.avg_latency_ms.unwrap_or(0.0);
                    la.total_cmp(&lb)
                })
                .then(a.order.cmp(&b.order))
        });
        endpoints.into_iter().map(|e| e.url).collect()
    }

    pub fn record_success(&self, url: &str, latency: Duration) {
        let mut endpoints = self.lock();
        if let Some(e) = endpoints.iter_mut().find(|e| e.url == url) {
            let sample = latency.as_secs_f64() * 1000.0;
            e.successes += 1;
            e.consecutive_failures = 0;
            e.avg_latency_ms = Some(match e.avg_latency_ms {
                Some(avg) => avg + LATENCY_ALPHA * (sample - avg),
                None => sample,
            });
        }
    }

    pub fn record_failure(&self, url: &str) {
        let mut endpoints = self.lock();
        if let Some(e) = endpoints.iter_mut().find(|e| e.url == url) {
            e.failures += 1;
            e.consecutive_failures = e.consecutive_failures.saturating_add(1);
        }
    }

    /// Current health in configured order.
    pub fn snapshot(&self) -> Vec<EndpointHealth> {
        self.lock().clone()
    }
}
