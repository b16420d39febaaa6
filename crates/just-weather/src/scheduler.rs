//! Step-driven request scheduler
//!
//! Lets several GET requests make progress side by side on one thread. Each
//! call to [`RequestScheduler::step`] moves every live task exactly one state
//! forward:
//!
//! ```text
//! Queued -> Connecting -> Sending -> Receiving -> Processing -> Completed
//!                \            \           \
//!                 +------------+-----------+---> Failed
//! ```
//!
//! Each transition still blocks for as long as its network operation takes,
//! bounded by the configured timeout.

use std::fmt;

use tracing::{debug, trace};

use just_weather_core::{Clock, Error, Result, SystemClock};
use just_weather_net::{
    HttpClientConfig, HttpResponse, Target, Transport, encode_get, read_response,
};

/// Tasks one scheduler holds at a time, finished ones included until reaped
pub const MAX_TASKS: usize = 16;

/// Receives the outcome of a task exactly once
pub type Callback = Box<dyn FnOnce(Result<HttpResponse>)>;

/// Lifecycle of a scheduled request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskState {
    #[default]
    Idle,
    Queued,
    Connecting,
    Sending,
    Receiving,
    Processing,
    Completed,
    Failed,
}

impl TaskState {
    /// Upper-case label used in logs
    pub fn name(&self) -> &'static str {
        match self {
            TaskState::Idle => "IDLE",
            TaskState::Queued => "QUEUED",
            TaskState::Connecting => "CONNECTING",
            TaskState::Sending => "SENDING",
            TaskState::Receiving => "RECEIVING",
            TaskState::Processing => "PROCESSING",
            TaskState::Completed => "COMPLETED",
            TaskState::Failed => "FAILED",
        }
    }

    /// Still has work left
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TaskState::Queued
                | TaskState::Connecting
                | TaskState::Sending
                | TaskState::Receiving
                | TaskState::Processing
        )
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier returned by [`RequestScheduler::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Task {
    id: TaskId,
    target: Target,
    state: TaskState,
    transport: Transport,
    response: Option<HttpResponse>,
    callback: Option<Callback>,
    started_ms: u64,
}

impl Task {
    fn fail(&mut self, err: Error) {
        debug!(task = self.id.0, from = %self.state, error = %err, "task failed");
        self.transport.close();
        self.state = TaskState::Failed;
        if let Some(callback) = self.callback.take() {
            callback(Err(err));
        }
    }

    /// Perform the work of the current state and move to the next one
    fn advance(&mut self, now_ms: u64, config: &HttpClientConfig) {
        let from = self.state;
        let outcome = match self.state {
            TaskState::Queued => {
                self.started_ms = now_ms;
                Ok(TaskState::Connecting)
            }
            TaskState::Connecting => self
                .transport
                .connect(&self.target.host, self.target.port, config.timeout)
                .map(|()| TaskState::Sending),
            TaskState::Sending => self
                .transport
                .send(&encode_get(&self.target, &config.user_agent))
                .map(|()| TaskState::Receiving),
            TaskState::Receiving => {
                let received = read_response(&mut self.transport, &config.decode_limits());
                self.transport.close();
                received.map(|response| {
                    self.response = Some(response);
                    TaskState::Processing
                })
            }
            TaskState::Processing => {
                let response = self
                    .response
                    .take()
                    .ok_or_else(|| Error::invalid_argument("no response to deliver"));
                match response {
                    Ok(response) => {
                        if let Some(callback) = self.callback.take() {
                            callback(Ok(response));
                        }
                        debug!(
                            task = self.id.0,
                            took_ms = now_ms.saturating_sub(self.started_ms),
                            "task completed"
                        );
                        Ok(TaskState::Completed)
                    }
                    Err(err) => Err(err),
                }
            }
            TaskState::Idle | TaskState::Completed | TaskState::Failed => return,
        };

        match outcome {
            Ok(next) => {
                trace!(task = self.id.0, %from, to = %next, "task advanced");
                self.state = next;
            }
            Err(err) => self.fail(err),
        }
    }
}

/// Owns a bounded queue of requests advanced by [`step`](Self::step)
pub struct RequestScheduler<C: Clock = SystemClock> {
    tasks: Vec<Task>,
    config: HttpClientConfig,
    clock: C,
    next_id: u64,
}

impl RequestScheduler {
    pub fn new(config: HttpClientConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for RequestScheduler {
    fn default() -> Self {
        Self::new(HttpClientConfig::default())
    }
}

impl<C: Clock> RequestScheduler<C> {
    pub fn with_clock(config: HttpClientConfig, clock: C) -> Self {
        Self {
            tasks: Vec::with_capacity(MAX_TASKS),
            config,
            clock,
            next_id: 1,
        }
    }

    /// Queue a GET of `url`; `callback` later receives the response or error
    ///
    /// Fails with `InvalidArgument` for an unusable URL or when
    /// [`MAX_TASKS`] tasks are already held.
    pub fn submit<F>(&mut self, url: &str, callback: F) -> Result<TaskId>
    where
        F: FnOnce(Result<HttpResponse>) + 'static,
    {
        if self.tasks.len() >= MAX_TASKS {
            return Err(Error::invalid_argument(format!(
                "scheduler is full ({MAX_TASKS} tasks)"
            )));
        }
        let target = Target::parse(url)?;

        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            target,
            state: TaskState::Queued,
            transport: Transport::new(),
            response: None,
            callback: Some(Box::new(callback)),
            started_ms: 0,
        });
        debug!(task = id.0, url, "task queued");
        Ok(id)
    }

    /// Advance every live task by one state; returns how many are still active
    pub fn step(&mut self, now_ms: u64) -> usize {
        for task in &mut self.tasks {
            task.advance(now_ms, &self.config);
        }
        self.active()
    }

    /// Step with the scheduler's clock until nothing is active, then drop
    /// finished tasks. Returns how many tasks were dropped.
    pub fn run_until_idle(&mut self) -> usize {
        while self.step(self.clock.now_ms()) > 0 {}
        self.reap()
    }

    /// Remove completed and failed tasks
    pub fn reap(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.state.is_finished());
        before - self.tasks.len()
    }

    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.tasks.iter().find(|t| t.id == id).map(|t| t.state)
    }

    /// Tasks with work left
    pub fn active(&self) -> usize {
        self.tasks.iter().filter(|t| t.state.is_active()).count()
    }

    /// Tasks held, finished ones included
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<C: Clock> fmt::Debug for RequestScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScheduler")
            .field("tasks", &self.tasks.len())
            .field("active", &self.active())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use just_weather_core::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_state_names() {
        assert_eq!(TaskState::Idle.name(), "IDLE");
        assert_eq!(TaskState::Queued.to_string(), "QUEUED");
        assert_eq!(TaskState::Failed.name(), "FAILED");
        assert!(TaskState::Processing.is_active());
        assert!(!TaskState::Completed.is_active());
        assert!(TaskState::Completed.is_finished());
        assert!(!TaskState::Idle.is_active());
    }

    #[test]
    fn test_submit_rejects_bad_url() {
        let mut scheduler: RequestScheduler = RequestScheduler::default();
        let err = scheduler.submit("https://example.com/", |_| {}).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut scheduler: RequestScheduler = RequestScheduler::default();
        for _ in 0..MAX_TASKS {
            scheduler.submit("http://127.0.0.1:1/", |_| {}).unwrap();
        }
        let err = scheduler.submit("http://127.0.0.1:1/", |_| {}).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(scheduler.len(), MAX_TASKS);
    }

    #[test]
    fn test_connect_failure_reaches_callback() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let outcome = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&outcome);

        let mut scheduler: RequestScheduler = RequestScheduler::default();
        let id = scheduler
            .submit(&format!("http://127.0.0.1:{port}/"), move |result| {
                *sink.borrow_mut() = Some(result.map(|r| r.status_code()));
            })
            .unwrap();

        assert_eq!(scheduler.state(id), Some(TaskState::Queued));
        assert_eq!(scheduler.step(0), 1);
        assert_eq!(scheduler.state(id), Some(TaskState::Connecting));
        assert_eq!(scheduler.step(1), 0);
        assert_eq!(scheduler.state(id), Some(TaskState::Failed));

        let outcome = outcome.borrow_mut().take().unwrap();
        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Connection);

        assert_eq!(scheduler.reap(), 1);
        assert!(scheduler.is_empty());
    }
}
