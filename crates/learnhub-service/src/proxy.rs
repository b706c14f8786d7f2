use reqwest::blocking::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use crate::storage_helpers::open_storage;
use learnhub_core::storage::{now_ts, RequestLog};

pub(crate) mod attempt;
pub(crate) mod candidates;
pub(crate) mod sequencer;
pub(crate) mod unwrap;

static PROXY_CLIENT: OnceLock<Client> = OnceLock::new();
static PROXY_TOTAL_REQUESTS: AtomicUsize = AtomicUsize::new(0);
static PROXY_ACTIVE_REQUESTS: AtomicUsize = AtomicUsize::new(0);
static PROXY_FALLBACK_ATTEMPTS: AtomicUsize = AtomicUsize::new(0);
static PROXY_EXHAUSTED_TOTAL: AtomicUsize = AtomicUsize::new(0);

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const ATTEMPT_TIMEOUT_MS: u64 = 10_000;
const GLOBAL_BUDGET_MS: u64 = 25_000;

/// Hard cap for a single candidate attempt.
pub(crate) fn attempt_timeout() -> Duration {
    Duration::from_millis(ATTEMPT_TIMEOUT_MS)
}

/// Wall-clock budget for a whole fallback sequence. Checked at candidate
/// boundaries only, so actual time may overshoot by at most one attempt.
pub(crate) fn global_budget() -> Duration {
    Duration::from_millis(GLOBAL_BUDGET_MS)
}

pub(crate) fn proxy_client() -> &'static Client {
    PROXY_CLIENT.get_or_init(|| {
        Client::builder()
            // 中文注释：client 级超时关闭，每次 attempt 在请求上单独限时；否则两层超时叠加会提前截断长 attempt。
            .timeout(None::<Duration>)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

pub(crate) struct ProxyRequestGuard;

impl Drop for ProxyRequestGuard {
    fn drop(&mut self) {
        PROXY_ACTIVE_REQUESTS.fetch_sub(1, Ordering::Relaxed);
    }
}

pub(crate) fn begin_proxy_request() -> ProxyRequestGuard {
    PROXY_TOTAL_REQUESTS.fetch_add(1, Ordering::Relaxed);
    PROXY_ACTIVE_REQUESTS.fetch_add(1, Ordering::Relaxed);
    ProxyRequestGuard
}

pub(crate) fn record_fallback_attempt() {
    PROXY_FALLBACK_ATTEMPTS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn record_exhausted_sequence() {
    PROXY_EXHAUSTED_TOTAL.fetch_add(1, Ordering::Relaxed);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ProxyMetricsSnapshot {
    pub total_requests: usize,
    pub active_requests: usize,
    pub fallback_attempts: usize,
    pub exhausted_sequences: usize,
}

pub(crate) fn proxy_metrics_snapshot() -> ProxyMetricsSnapshot {
    ProxyMetricsSnapshot {
        total_requests: PROXY_TOTAL_REQUESTS.load(Ordering::Relaxed),
        active_requests: PROXY_ACTIVE_REQUESTS.load(Ordering::Relaxed),
        fallback_attempts: PROXY_FALLBACK_ATTEMPTS.load(Ordering::Relaxed),
        exhausted_sequences: PROXY_EXHAUSTED_TOTAL.load(Ordering::Relaxed),
    }
}

pub(crate) fn proxy_metrics_prometheus() -> String {
    let m = proxy_metrics_snapshot();
    format!(
        "learnhub_proxy_requests_total {}\n\
learnhub_proxy_requests_active {}\n\
learnhub_proxy_fallback_attempts_total {}\n\
learnhub_proxy_exhausted_sequences_total {}\n",
        m.total_requests, m.active_requests, m.fallback_attempts, m.exhausted_sequences,
    )
}

/// Records the final result of a proxied operation for later diagnosis.
/// Upstream URLs are stored host-stripped; a missing storage config makes
/// this a no-op.
pub(crate) fn write_request_log(
    request_path: &str,
    method: &str,
    upstream_url: Option<&str>,
    status_code: Option<u16>,
    error: Option<&str>,
) {
    let Some(storage) = open_storage() else {
        return;
    };
    let _ = storage.insert_request_log(&RequestLog {
        request_path: request_path.to_string(),
        method: method.to_string(),
        upstream_url: upstream_url.map(|v| candidates::safe_path(v)),
        status_code: status_code.map(i64::from),
        error: error.map(|v| v.to_string()),
        created_at: now_ts(),
    });
}
