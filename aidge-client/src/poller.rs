//! Task status poller
//!
//! Queries a task's status endpoint until the service reports `finished` or
//! `failed`, sleeping between attempts. Pending answers grow the delay by 1.5x,
//! failed queries by 2x, both capped at `max_delay`. When `max_retries`
//! attempts pass without a terminal status the poller gives up with a
//! synthetic timeout payload instead of an error.

use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::TaskClient;

pub const DEFAULT_MAX_RETRIES: u32 = 60;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

const PENDING_GROWTH: f64 = 1.5;
const ERROR_GROWTH: f64 = 2.0;

/// Poll loop limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    /// Number of status queries before giving up
    pub max_retries: u32,
    /// Delay after the first non-terminal attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl PollPolicy {
    /// Worst-case time spent sleeping before a timeout, saturating at `Duration::MAX`
    pub fn worst_case_wait(&self) -> Duration {
        self.max_delay
            .checked_mul(self.max_retries)
            .unwrap_or(Duration::MAX)
    }
}

/// Backoff state for one poll loop
#[derive(Debug, Clone)]
pub struct Backoff {
    delay: Duration,
    max_delay: Duration,
}

impl Backoff {
    pub fn new(policy: &PollPolicy) -> Self {
        Self {
            delay: policy.initial_delay.min(policy.max_delay),
            max_delay: policy.max_delay,
        }
    }

    /// Delay the next wait will use
    pub fn current(&self) -> Duration {
        self.delay
    }

    /// Returns the wait after a pending answer and grows the delay gently
    pub fn after_pending(&mut self) -> Duration {
        self.advance(PENDING_GROWTH)
    }

    /// Returns the wait after a failed query and grows the delay faster
    pub fn after_error(&mut self) -> Duration {
        self.advance(ERROR_GROWTH)
    }

    fn advance(&mut self, factor: f64) -> Duration {
        let wait = self.delay;
        self.delay = self.delay.mul_f64(factor).min(self.max_delay);
        wait
    }
}

/// How a poll loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The service reported `finished` or `failed`; carries the full body
    Terminal(JsonValue),
    /// No terminal status within the retry budget
    TimedOut,
}

impl PollOutcome {
    /// Payload reported for a poll timeout
    pub fn timeout_payload() -> JsonValue {
        aidge_core::domain::task::timeout_payload()
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, PollOutcome::TimedOut)
    }

    /// Terminal body, or the timeout payload
    pub fn into_payload(self) -> JsonValue {
        match self {
            PollOutcome::Terminal(body) => body,
            PollOutcome::TimedOut => Self::timeout_payload(),
        }
    }
}

/// Drives status queries for submitted tasks
#[derive(Debug, Clone)]
pub struct Poller {
    client: TaskClient,
    policy: PollPolicy,
}

impl Poller {
    pub fn new(client: TaskClient, policy: PollPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Session the poller queries through
    pub fn client(&self) -> &TaskClient {
        &self.client
    }

    /// Poll until the task reaches a terminal state or the retry budget runs out
    ///
    /// Query failures are retried; they only change how fast the delay grows.
    pub async fn poll_until_terminal(&self, status_endpoint_name: &str, task_id: &str) -> PollOutcome {
        let mut backoff = Backoff::new(&self.policy);

        for attempt in 1..=self.policy.max_retries {
            let wait = match self.client.query_status(status_endpoint_name, task_id).await {
                Ok(status) if status.is_terminal() => {
                    info!(
                        "Task {} reached status {} after {} attempt(s)",
                        task_id,
                        status.task_status.as_deref().unwrap_or_default(),
                        attempt
                    );
                    return PollOutcome::Terminal(status.body);
                }
                Ok(status) => {
                    debug!(
                        "Task {} still {} (attempt {}/{})",
                        task_id,
                        status.task_status.as_deref().unwrap_or("pending"),
                        attempt,
                        self.policy.max_retries
                    );
                    backoff.after_pending()
                }
                Err(e) => {
                    warn!(
                        "Status query for task {} failed (attempt {}/{}): {}",
                        task_id, attempt, self.policy.max_retries, e
                    );
                    backoff.after_error()
                }
            };

            tokio::time::sleep(wait).await;
        }

        warn!(
            "Task {} did not finish within {} attempts",
            task_id, self.policy.max_retries
        );
        PollOutcome::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, ok, test_config};
    use crate::transport::HttpMethod;
    use serde_json::json;
    use tokio::time::Instant;

    fn secs(values: &[f64]) -> Vec<Duration> {
        values.iter().map(|s| Duration::from_secs_f64(*s)).collect()
    }

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_retries, 60);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        assert_eq!(policy.worst_case_wait(), Duration::from_secs(600));
    }

    #[test]
    fn test_worst_case_wait_saturates() {
        let policy = PollPolicy {
            max_retries: u32::MAX,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_millis(u64::MAX),
        };
        assert_eq!(policy.worst_case_wait(), Duration::MAX);
    }

    #[test]
    fn test_pending_backoff_sequence() {
        let mut backoff = Backoff::new(&PollPolicy::default());
        let waits: Vec<Duration> = (0..8).map(|_| backoff.after_pending()).collect();

        assert_eq!(
            waits,
            secs(&[1.0, 1.5, 2.25, 3.375, 5.0625, 7.59375, 10.0, 10.0])
        );
    }

    #[test]
    fn test_error_backoff_sequence() {
        let mut backoff = Backoff::new(&PollPolicy::default());
        let waits: Vec<Duration> = (0..6).map(|_| backoff.after_error()).collect();

        assert_eq!(waits, secs(&[1.0, 2.0, 4.0, 8.0, 10.0, 10.0]));
    }

    #[test]
    fn test_backoff_follows_closed_form() {
        let policy = PollPolicy {
            max_retries: 10,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        };

        for k in 0..12 {
            let mut pending = Backoff::new(&policy);
            let mut failing = Backoff::new(&policy);
            for _ in 0..k {
                pending.after_pending();
                failing.after_error();
            }

            let expected_pending = (0.25 * 1.5f64.powi(k)).min(5.0);
            let expected_error = (0.25 * 2f64.powi(k)).min(5.0);
            assert!((pending.current().as_secs_f64() - expected_pending).abs() < 1e-6);
            assert!((failing.current().as_secs_f64() - expected_error).abs() < 1e-6);
        }
    }

    #[test]
    fn test_timeout_payload() {
        assert_eq!(
            PollOutcome::TimedOut.into_payload(),
            json!({ "code": -1, "message": "polling timed out" })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_finishes_on_third_poll() {
        let transport = ScriptedTransport::sequence(vec![
            ok(r#"{"data":{"taskStatus":"running"}}"#),
            ok(r#"{"data":{"taskStatus":"running"}}"#),
            ok(r#"{"data":{"taskStatus":"finished","value":42}}"#),
        ]);
        let client = TaskClient::with_transport(test_config(), transport.clone()).unwrap();
        let poller = Poller::new(client, PollPolicy::default());

        let start = Instant::now();
        let outcome = poller
            .poll_until_terminal("/ai/image/translation_mllm/results", "T1")
            .await;

        assert_eq!(
            outcome,
            PollOutcome::Terminal(json!({ "data": { "taskStatus": "finished", "value": 42 } }))
        );
        assert_eq!(transport.call_count(), 3);
        assert!(transport.requests().iter().all(|r| r.method == HttpMethod::Get));

        let times = transport.request_times();
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_millis(1500));
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_is_terminal() {
        let transport = ScriptedTransport::always(ok(r#"{"data":{"taskStatus":"failed"}}"#));
        let client = TaskClient::with_transport(test_config(), transport.clone()).unwrap();
        let poller = Poller::new(client, PollPolicy::default());

        let outcome = poller.poll_until_terminal("/ai/x/results", "T1").await;

        assert!(!outcome.is_timed_out());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_errors_back_off_faster() {
        let transport = ScriptedTransport::sequence(vec![
            Err("connection reset"),
            ok("not json"),
            ok(r#"{"data":{"taskStatus":"finished"}}"#),
        ]);
        let client = TaskClient::with_transport(test_config(), transport.clone()).unwrap();
        let poller = Poller::new(client, PollPolicy::default());

        let outcome = poller.poll_until_terminal("/ai/x/results", "T1").await;

        assert!(!outcome.is_timed_out());
        let times = transport.request_times();
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_max_retries() {
        let transport = ScriptedTransport::always(ok(r#"{"data":{"taskStatus":"running"}}"#));
        let client = TaskClient::with_transport(test_config(), transport.clone()).unwrap();
        let policy = PollPolicy {
            max_retries: 5,
            ..PollPolicy::default()
        };
        let poller = Poller::new(client, policy);

        let outcome = poller.poll_until_terminal("/ai/x/results", "T1").await;

        assert_eq!(outcome, PollOutcome::TimedOut);
        assert_eq!(transport.call_count(), 5);
        assert_eq!(
            outcome.into_payload(),
            json!({ "code": -1, "message": "polling timed out" })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_budget_times_out() {
        let transport = ScriptedTransport::always(ok(r#"{"data":{"taskStatus":"running"}}"#));
        let client = TaskClient::with_transport(test_config(), transport.clone()).unwrap();
        let poller = Poller::new(client, PollPolicy::default());

        let outcome = poller.poll_until_terminal("/ai/x/results", "T1").await;

        assert!(outcome.is_timed_out());
        assert_eq!(transport.call_count(), 60);
    }
}
