//! Waits for a run to finish.
//!
//! Polls the run status with a growing delay between attempts, gives up after
//! [`PollPolicy::timeout`], and stops early when the cancellation token fires
//! or the service reports that the run ended without an answer. A run that is
//! given up on is cancelled on the service too, since a thread with an active
//! run refuses new messages.

use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::AssistantApi;
use crate::client::error::ApiError;
use crate::client::types::{Run, RunId, RunStatus, ThreadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay after the first pending status.
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub multiplier: u32,
    /// Overall budget for one run, measured from the first poll.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(4),
            multiplier: 2,
            timeout: Duration::from_secs(120),
        }
    }
}

impl PollPolicy {
    fn next_interval(&self, current: Duration) -> Duration {
        current.saturating_mul(self.multiplier).min(self.max_interval)
    }
}

#[derive(Debug, Clone)]
pub struct Completed {
    pub run: Run,
    pub elapsed: Duration,
    pub attempts: u32,
}

#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("run ended with status {status}: {message}")]
    RunEnded { status: RunStatus, message: String },
    #[error("run still pending after {:.2} seconds", .elapsed.as_secs_f64())]
    TimedOut { elapsed: Duration },
    #[error("cancelled while waiting for the run")]
    Cancelled,
}

pub async fn wait_for_run<A: AssistantApi>(
    api: &A,
    thread_id: &ThreadId,
    run_id: &RunId,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Completed, PollError> {
    let result = poll(api, thread_id, run_id, policy, cancel).await;
    if let Err(PollError::TimedOut { .. } | PollError::Cancelled) = &result {
        match api.cancel_run(thread_id, run_id).await {
            Ok(run) => info!(run_id = %run_id, status = %run.status, "abandoned run cancelled"),
            Err(err) => warn!(run_id = %run_id, error = %err, "could not cancel abandoned run"),
        }
    }
    result
}

async fn poll<A: AssistantApi>(
    api: &A,
    thread_id: &ThreadId,
    run_id: &RunId,
    policy: &PollPolicy,
    cancel: &CancellationToken,
) -> Result<Completed, PollError> {
    let started = Instant::now();
    let deadline = started + policy.timeout;
    let mut interval = policy.initial_interval;
    let mut attempts = 0u32;

    loop {
        let run = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = sleep_until(deadline) => {
                return Err(PollError::TimedOut { elapsed: started.elapsed() });
            }
            run = api.retrieve_run(thread_id, run_id) => run?,
        };
        attempts += 1;

        if run.status == RunStatus::Completed {
            let elapsed = started.elapsed();
            info!(
                run_id = %run_id,
                attempts,
                elapsed_secs = elapsed.as_secs_f64(),
                "run completed"
            );
            return Ok(Completed {
                run,
                elapsed,
                attempts,
            });
        }

        if run.status.is_unsuccessful_end() {
            let message = run
                .last_error
                .as_ref()
                .map(|e| format!("{} ({})", e.message, e.code))
                .unwrap_or_else(|| "no error details".to_string());
            warn!(run_id = %run_id, status = %run.status, %message, "run did not complete");
            return Err(PollError::RunEnded {
                status: run.status,
                message,
            });
        }
        debug!(run_id = %run_id, status = %run.status, attempts, "run pending");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PollError::Cancelled),
            _ = sleep_until(deadline) => {
                return Err(PollError::TimedOut { elapsed: started.elapsed() });
            }
            _ = sleep(interval) => {}
        }
        interval = policy.next_interval(interval);
    }
}
