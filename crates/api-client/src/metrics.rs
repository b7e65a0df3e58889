//! Client-side token metrics.
//!
//! Recorded through the `metrics` facade; the host application decides
//! whether a recorder is installed. Labels stay bounded:
//! - `status`: "success" or "error"
//! - `result`: "hit" or "miss"

use metrics::counter;

/// Record one issuer round trip.
pub fn record_token_acquisition(status: &str) {
    counter!("client_token_acquisitions_total", "status" => status.to_string()).increment(1);
}

/// Record a cache lookup outcome.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("client_token_cache_total", "result" => result).increment(1);
}

pub fn record_cache_invalidation() {
    counter!("client_token_invalidations_total").increment(1);
}

/// Record a request replayed after the API answered 401.
pub fn record_unauthorized_retry() {
    counter!("client_unauthorized_retries_total").increment(1);
}
