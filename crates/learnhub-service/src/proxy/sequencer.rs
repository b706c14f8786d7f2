use std::time::{Duration, Instant};

use super::attempt::AttemptOutcome;
use super::candidates::AttemptSpec;

/// Final outcome of a fallback sequence. `tried` lists the failed candidates
/// as "METHOD path"; the winning candidate is not recorded.
pub(crate) enum SequencerOutcome<R> {
    Completed {
        response: R,
        tried: Vec<String>,
    },
    /// A candidate was reachable and understood but rejected the request.
    /// The backend's own answer is surfaced unchanged.
    Rejected {
        status: u16,
        content_type: Option<String>,
        body: String,
        tried: Vec<String>,
    },
    Exhausted {
        message: String,
        tried: Vec<String>,
        last_status: Option<u16>,
    },
}

/// Drives the candidate list through the executor under a global wall-clock
/// budget. The budget is advisory: it is checked only between candidates, so
/// an attempt already in flight is never pre-empted. Each candidate runs at
/// most once.
pub(crate) fn run_candidates<R, E>(
    candidates: &[AttemptSpec],
    global_budget: Duration,
    mut execute: E,
) -> SequencerOutcome<R>
where
    E: FnMut(&AttemptSpec) -> AttemptOutcome<R>,
{
    let start = Instant::now();
    let mut tried: Vec<String> = Vec::new();
    let mut last_status: Option<u16> = None;
    let mut last_network_error: Option<String> = None;

    for spec in candidates {
        if start.elapsed() > global_budget {
            super::record_exhausted_sequence();
            return SequencerOutcome::Exhausted {
                message: "Global timeout exceeded".to_string(),
                tried,
                last_status,
            };
        }
        match execute(spec) {
            AttemptOutcome::Success(response) => {
                return SequencerOutcome::Completed { response, tried };
            }
            AttemptOutcome::RetryableFailure { status, .. } => {
                tried.push(spec.label());
                last_status = Some(status);
                super::record_fallback_attempt();
            }
            AttemptOutcome::NetworkError { message, .. } => {
                // 中文注释：网络类失败继续换候选而不是立刻终止；单个候选的连接抖动不代表其余路径也不可达。
                tried.push(spec.label());
                last_network_error = Some(message);
                super::record_fallback_attempt();
            }
            AttemptOutcome::TerminalFailure {
                status,
                content_type,
                body,
            } => {
                tried.push(spec.label());
                return SequencerOutcome::Rejected {
                    status,
                    content_type,
                    body,
                    tried,
                };
            }
        }
    }

    super::record_exhausted_sequence();
    let message = last_network_error.unwrap_or_else(|| "No response from backend".to_string());
    SequencerOutcome::Exhausted {
        message,
        tried,
        last_status,
    }
}
