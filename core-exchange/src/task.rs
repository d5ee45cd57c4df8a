//! # Exchange Task State Machine
//!
//! Tracks one remote conversion task and drives its poll loop.
//!
//! ## State Machine
//!
//! ```text
//! Pending ──→ Done
//!    │
//!    ├──────→ Failed
//!    └──────→ TimedOut
//! ```
//!
//! Tasks are ephemeral: they live for the duration of one import or export
//! call and are never persisted.
//!
//! ## Polling
//!
//! [`poll_until_done`] polls once, then keeps sleeping `interval` and
//! polling again while the task is pending. Bounds are checked between
//! attempts: the loop stops with [`ExchangeError::TimedOut`] once
//! `max_attempts` polls have been made or `max_wait` has elapsed, whichever
//! comes first. A policy with neither bound cannot be built.

use crate::error::{ExchangeError, Result};
use core_runtime::config::GatewayConfig;
use provider_universer::{Credential, ExchangeClient, ExchangeDirection, TaskPoll};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Local state of an exchange task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Done,
    Failed,
    TimedOut,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
            TaskState::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long to keep polling a pending task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    max_attempts: Option<u32>,
    max_wait: Option<Duration>,
}

impl PollPolicy {
    /// # Errors
    ///
    /// Returns [`ExchangeError::InvalidPolicy`] if neither bound is set or a
    /// set bound is zero.
    pub fn new(
        interval: Duration,
        max_attempts: Option<u32>,
        max_wait: Option<Duration>,
    ) -> Result<Self> {
        if max_attempts.is_none() && max_wait.is_none() {
            return Err(ExchangeError::InvalidPolicy(
                "at least one of max_attempts or max_wait must be set".to_string(),
            ));
        }
        if max_attempts == Some(0) {
            return Err(ExchangeError::InvalidPolicy(
                "max_attempts must be greater than zero".to_string(),
            ));
        }
        if max_wait.is_some_and(|wait| wait.is_zero()) {
            return Err(ExchangeError::InvalidPolicy(
                "max_wait must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            interval,
            max_attempts,
            max_wait,
        })
    }

    pub fn attempts(interval: Duration, max_attempts: u32) -> Result<Self> {
        Self::new(interval, Some(max_attempts), None)
    }

    pub fn deadline(interval: Duration, max_wait: Duration) -> Result<Self> {
        Self::new(interval, None, Some(max_wait))
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(
            config.poll_interval,
            config.poll_max_attempts,
            config.poll_max_wait,
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }

    fn exhausted(&self, attempts: u32, elapsed: Duration) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
            || self.max_wait.is_some_and(|max| elapsed >= max)
    }
}

/// One remote exchange task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeTask {
    task_id: String,
    direction: ExchangeDirection,
    state: TaskState,
    attempts: u32,
    result_id: Option<String>,
    failure: Option<String>,
}

impl ExchangeTask {
    pub fn new(task_id: impl Into<String>, direction: ExchangeDirection) -> Self {
        Self {
            task_id: task_id.into(),
            direction,
            state: TaskState::Pending,
            attempts: 0,
            result_id: None,
            failure: None,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn direction(&self) -> ExchangeDirection {
        self.direction
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Number of polls recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Unit id (import) or file id (export) once done
    pub fn result_id(&self) -> Option<&str> {
        self.result_id.as_deref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Record the outcome of one poll
    ///
    /// # Errors
    ///
    /// Returns an error if the task is already terminal
    pub fn record(&mut self, poll: TaskPoll) -> Result<TaskState> {
        match poll {
            TaskPoll::Pending => {
                self.validate_transition(TaskState::Pending)?;
                self.attempts += 1;
            }
            TaskPoll::Done(result_id) => {
                self.validate_transition(TaskState::Done)?;
                self.attempts += 1;
                self.state = TaskState::Done;
                self.result_id = Some(result_id);
            }
        }
        Ok(self.state)
    }

    /// Mark the task as failed after a poll error
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.validate_transition(TaskState::Failed)?;
        self.attempts += 1;
        self.state = TaskState::Failed;
        self.failure = Some(reason.into());
        Ok(())
    }

    /// Mark the task as abandoned because the poll bound was reached
    pub fn time_out(&mut self) -> Result<()> {
        self.validate_transition(TaskState::TimedOut)?;
        self.state = TaskState::TimedOut;
        Ok(())
    }

    fn validate_transition(&self, to: TaskState) -> Result<()> {
        if self.state.is_terminal() {
            return Err(ExchangeError::InvalidStateTransition {
                from: self.state.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        Ok(())
    }
}

/// Poll `task_id` until it is done, fails, or the policy bound is reached.
///
/// Returns the result id reported on completion.
#[instrument(skip(client, policy, credential))]
pub async fn poll_until_done(
    client: &dyn ExchangeClient,
    task_id: &str,
    direction: ExchangeDirection,
    policy: &PollPolicy,
    credential: &Credential,
) -> Result<String> {
    let mut task = ExchangeTask::new(task_id, direction);
    let started = Instant::now();

    loop {
        match client.poll_task(task_id, direction, credential).await {
            Ok(poll) => {
                if task.record(poll)? == TaskState::Done {
                    let result_id = task.result_id().unwrap_or_default().to_string();
                    info!(attempts = task.attempts(), result_id = %result_id, "Exchange task done");
                    return Ok(result_id);
                }
            }
            Err(e) => {
                task.fail(e.to_string())?;
                warn!(attempts = task.attempts(), error = %e, "Exchange task poll failed");
                return Err(e.into());
            }
        }

        if policy.exhausted(task.attempts(), started.elapsed()) {
            break;
        }

        debug!(attempts = task.attempts(), "Exchange task pending");
        tokio::time::sleep(policy.interval()).await;

        if policy.exhausted(task.attempts(), started.elapsed()) {
            break;
        }
    }

    task.time_out()?;
    warn!(
        attempts = task.attempts(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Exchange task timed out"
    );
    Err(ExchangeError::TimedOut {
        task_id: task_id.to_string(),
        attempts: task.attempts(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_requires_a_bound() {
        let result = PollPolicy::new(Duration::from_millis(500), None, None);
        assert!(matches!(result, Err(ExchangeError::InvalidPolicy(_))));
    }

    #[test]
    fn test_policy_rejects_zero_bounds() {
        assert!(PollPolicy::attempts(Duration::from_millis(500), 0).is_err());
        assert!(PollPolicy::deadline(Duration::from_millis(500), Duration::ZERO).is_err());
    }

    #[test]
    fn test_policy_exhaustion() {
        let policy = PollPolicy::new(
            Duration::from_millis(500),
            Some(3),
            Some(Duration::from_secs(10)),
        )
        .unwrap();

        assert!(!policy.exhausted(2, Duration::from_secs(1)));
        assert!(policy.exhausted(3, Duration::from_secs(1)));
        assert!(policy.exhausted(1, Duration::from_secs(10)));
    }

    #[test]
    fn test_task_new() {
        let task = ExchangeTask::new("t-1", ExchangeDirection::Import);

        assert_eq!(task.task_id(), "t-1");
        assert_eq!(task.state(), TaskState::Pending);
        assert_eq!(task.attempts(), 0);
        assert!(task.result_id().is_none());
    }

    #[test]
    fn test_task_pending_then_done() {
        let mut task = ExchangeTask::new("t-1", ExchangeDirection::Export);

        assert_eq!(task.record(TaskPoll::Pending).unwrap(), TaskState::Pending);
        assert_eq!(
            task.record(TaskPoll::Done("f-1".to_string())).unwrap(),
            TaskState::Done
        );
        assert_eq!(task.attempts(), 2);
        assert_eq!(task.result_id(), Some("f-1"));
    }

    #[test]
    fn test_task_fail() {
        let mut task = ExchangeTask::new("t-1", ExchangeDirection::Import);
        task.fail("status error").unwrap();

        assert_eq!(task.state(), TaskState::Failed);
        assert_eq!(task.failure(), Some("status error"));
        assert_eq!(task.attempts(), 1);
    }

    #[test]
    fn test_terminal_states_cannot_transition() {
        let mut done = ExchangeTask::new("t-1", ExchangeDirection::Import);
        done.record(TaskPoll::Done("u-1".to_string())).unwrap();
        assert!(done.record(TaskPoll::Pending).is_err());
        assert!(done.fail("late").is_err());
        assert!(done.time_out().is_err());

        let mut timed_out = ExchangeTask::new("t-2", ExchangeDirection::Import);
        timed_out.time_out().unwrap();
        assert_eq!(timed_out.state(), TaskState::TimedOut);
        assert!(timed_out.record(TaskPoll::Done("u-2".to_string())).is_err());

        let mut failed = ExchangeTask::new("t-3", ExchangeDirection::Export);
        failed.fail("boom").unwrap();
        assert!(matches!(
            failed.time_out(),
            Err(ExchangeError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TaskState::TimedOut.to_string(), "timed_out");
        assert!(TaskState::Done.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
    }
}
