//! The task agent: submit, supersede, observe.

use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, error, warn};

use flow_common::CancelToken;

/// Lifecycle notification from a [`TaskAgent`].
#[derive(Debug)]
pub enum AgentEvent<T> {
    /// New work was accepted; any previous task is now superseded.
    Submit,
    /// The task finished and its value was published.
    Update(Arc<T>),
    /// The task returned an error while still current. A superseded task's
    /// outcome, error or not, is dropped without any notification.
    Reject(Arc<anyhow::Error>),
    /// An observer raised an error while reacting to a notification. Never
    /// suppressed by cancellation; it indicates a consumer bug, not a data
    /// problem.
    Fail(Arc<anyhow::Error>),
}

impl<T> Clone for AgentEvent<T> {
    fn clone(&self) -> Self {
        match self {
            AgentEvent::Submit => AgentEvent::Submit,
            AgentEvent::Update(v) => AgentEvent::Update(Arc::clone(v)),
            AgentEvent::Reject(e) => AgentEvent::Reject(Arc::clone(e)),
            AgentEvent::Fail(e) => AgentEvent::Fail(Arc::clone(e)),
        }
    }
}

/// Receives every lifecycle event of an agent.
///
/// An observer returning `Err` from a non-failure event causes a
/// [`AgentEvent::Fail`] notification; errors raised while handling a
/// failure are only logged, so observers cannot fail in a loop.
pub trait AgentObserver<T>: Send + Sync {
    fn on_event(&self, event: &AgentEvent<T>) -> anyhow::Result<()>;
}

impl<T, F> AgentObserver<T> for F
where
    F: Fn(&AgentEvent<T>) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &AgentEvent<T>) -> anyhow::Result<()> {
        self(event)
    }
}

struct AgentInner<T> {
    name: String,
    value: RwLock<Option<Arc<T>>>,
    cancel: Mutex<CancelToken>,
    observers: RwLock<Vec<Box<dyn AgentObserver<T>>>>,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl<T> AgentInner<T> {
    fn emit(&self, event: AgentEvent<T>) {
        let failures: Vec<anyhow::Error> = {
            let observers = self.observers.read().expect("observer lock poisoned");
            observers
                .iter()
                .filter_map(|o| o.on_event(&event).err())
                .collect()
        };
        let failing_already = matches!(event, AgentEvent::Fail(_));
        for err in failures {
            if failing_already {
                error!(agent = %self.name, error = %err, "observer failed while handling failure");
            } else {
                warn!(agent = %self.name, error = %err, "observer failed");
                self.emit(AgentEvent::Fail(Arc::new(err)));
            }
        }
    }
}

/// Supervises one cancellable computation and caches its latest value.
///
/// Work runs on the blocking thread pool and receives a [`CancelToken`] it
/// should poll between units of work. Cancellation is cooperative: a
/// superseded task keeps running until it notices, but its result can
/// never be published.
pub struct TaskAgent<T> {
    inner: Arc<AgentInner<T>>,
}

impl<T> Clone for TaskAgent<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> TaskAgent<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AgentInner {
                name: name.into(),
                value: RwLock::new(None),
                cancel: Mutex::new(CancelToken::new()),
                observers: RwLock::new(Vec::new()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn observe(&self, observer: impl AgentObserver<T> + 'static) {
        self.inner
            .observers
            .write()
            .expect("observer lock poisoned")
            .push(Box::new(observer));
    }

    /// The most recently published value, if any.
    pub fn current_value(&self) -> Option<Arc<T>> {
        self.inner
            .value
            .read()
            .expect("value lock poisoned")
            .clone()
    }

    /// Cancel the in-flight task without submitting new work.
    ///
    /// The cached value stays; when the task finishes, its result is
    /// dropped silently.
    pub fn cancel(&self) {
        self.inner
            .cancel
            .lock()
            .expect("cancel lock poisoned")
            .cancel();
    }

    /// Submit new work, superseding any in-flight task.
    ///
    /// Must be called from within a tokio runtime. The closure runs on the
    /// blocking pool; `Ok` publishes the value and notifies
    /// [`AgentEvent::Update`] unless the task was cancelled in the
    /// meantime, in which case the result is dropped without any
    /// notification and the cached value is untouched.
    pub fn submit<F>(&self, work: F)
    where
        F: FnOnce(CancelToken) -> anyhow::Result<T> + Send + 'static,
    {
        let token = {
            let mut slot = self.inner.cancel.lock().expect("cancel lock poisoned");
            slot.cancel();
            *slot = CancelToken::new();
            slot.clone()
        };
        debug!(agent = %self.inner.name, "task submitted");
        self.inner.emit(AgentEvent::Submit);

        let inner = Arc::clone(&self.inner);
        let worker_token = token.clone();
        let handle = tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || work(worker_token)).await;
            match outcome {
                Ok(Ok(value)) => {
                    if token.is_cancelled() {
                        // A stale result loses the race silently.
                        debug!(agent = %inner.name, "result from superseded task dropped");
                    } else {
                        let value = Arc::new(value);
                        *inner.value.write().expect("value lock poisoned") =
                            Some(Arc::clone(&value));
                        debug!(agent = %inner.name, "value published");
                        inner.emit(AgentEvent::Update(value));
                    }
                }
                Ok(Err(err)) => {
                    // Errors from superseded tasks (typically their own
                    // cancellation tripping mid-build) are dropped silently.
                    if token.is_cancelled() {
                        debug!(agent = %inner.name, error = %err, "error from superseded task dropped");
                    } else {
                        error!(agent = %inner.name, error = %err, "task failed");
                        inner.emit(AgentEvent::Reject(Arc::new(err)));
                    }
                }
                Err(join_err) => {
                    if token.is_cancelled() {
                        debug!(agent = %inner.name, error = %join_err, "panic in superseded task dropped");
                    } else {
                        error!(agent = %inner.name, error = %join_err, "task panicked");
                        inner.emit(AgentEvent::Reject(Arc::new(anyhow::Error::new(join_err))));
                    }
                }
            }
        });
        let mut tasks = self.inner.tasks.lock().expect("task lock poisoned");
        // Settled supervisors have nothing left to wait for.
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    /// Wait until every submitted task has settled. Intended for shutdown
    /// and tests; new submissions during the wait are not covered.
    pub async fn idle(&self) {
        let handles: Vec<_> = {
            let mut tasks = self.inner.tasks.lock().expect("task lock poisoned");
            tasks.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    struct Log {
        events: Mutex<Vec<String>>,
    }

    impl Log {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn entries(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AgentObserver<u32> for Arc<Log> {
        fn on_event(&self, event: &AgentEvent<u32>) -> anyhow::Result<()> {
            let label = match event {
                AgentEvent::Submit => "submit".to_string(),
                AgentEvent::Update(v) => format!("update:{}", v),
                AgentEvent::Reject(e) => format!("reject:{}", e),
                AgentEvent::Fail(e) => format!("fail:{}", e),
            };
            self.events.lock().unwrap().push(label);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submit_publishes_value() {
        let agent: TaskAgent<u32> = TaskAgent::new("grid");
        let log = Log::new();
        agent.observe(Arc::clone(&log));

        agent.submit(|_cancel| Ok(42));
        agent.idle().await;

        assert_eq!(agent.current_value().as_deref(), Some(&42));
        assert_eq!(log.entries(), vec!["submit", "update:42"]);
    }

    #[tokio::test]
    async fn test_cancelled_result_is_dropped_silently() {
        let agent: TaskAgent<u32> = TaskAgent::new("field");
        let log = Log::new();
        agent.observe(Arc::clone(&log));

        agent.submit(|_cancel| Ok(1));
        agent.idle().await;

        // Second task blocks until released; cancel lands first.
        let (tx, rx) = mpsc::channel::<()>();
        agent.submit(move |_cancel| {
            rx.recv().ok();
            Ok(2)
        });
        agent.cancel();
        tx.send(()).unwrap();
        agent.idle().await;

        // The stale result never became the current value, and losing the
        // race is not an event observers hear about.
        assert_eq!(agent.current_value().as_deref(), Some(&1));
        assert_eq!(log.entries(), vec!["submit", "update:1", "submit"]);
    }

    #[tokio::test]
    async fn test_submit_supersedes_running_task() {
        let agent: TaskAgent<u32> = TaskAgent::new("field");
        let log = Log::new();
        agent.observe(Arc::clone(&log));

        let (tx, rx) = mpsc::channel::<()>();
        agent.submit(move |_cancel| {
            rx.recv().ok();
            Ok(10)
        });
        agent.submit(|_cancel| Ok(20));
        tx.send(()).unwrap();
        agent.idle().await;

        // The superseded task's 10 vanished quietly; 20 won regardless of
        // completion order.
        assert_eq!(agent.current_value().as_deref(), Some(&20));
        let entries = log.entries();
        assert_eq!(entries.iter().filter(|e| *e == "submit").count(), 2);
        assert!(entries.contains(&"update:20".to_string()));
        assert!(!entries.contains(&"update:10".to_string()));
        assert!(!entries.iter().any(|e| e.starts_with("reject")));
    }

    #[tokio::test]
    async fn test_error_surfaces_on_reject_path() {
        let agent: TaskAgent<u32> = TaskAgent::new("grid");
        let log = Log::new();
        agent.observe(Arc::clone(&log));

        agent.submit(|_cancel| Err(anyhow::anyhow!("no such layer")));
        agent.idle().await;

        assert_eq!(agent.current_value(), None);
        assert_eq!(log.entries(), vec!["submit", "reject:no such layer"]);
    }

    #[tokio::test]
    async fn test_error_after_cancel_is_silent() {
        let agent: TaskAgent<u32> = TaskAgent::new("grid");
        let log = Log::new();
        agent.observe(Arc::clone(&log));

        let (tx, rx) = mpsc::channel::<()>();
        agent.submit(move |_cancel| {
            rx.recv().ok();
            Err(anyhow::anyhow!("aborted"))
        });
        agent.cancel();
        tx.send(()).unwrap();
        agent.idle().await;

        // No reject, no fail: a superseded unit's error is dropped.
        assert_eq!(log.entries(), vec!["submit"]);
    }

    #[tokio::test]
    async fn test_finished_supervisors_pruned_on_submit() {
        let agent: TaskAgent<u32> = TaskAgent::new("grid");
        for i in 0..20 {
            agent.submit(move |_cancel| Ok(i));
        }
        // Let every supervisor settle without draining the handle list.
        while !agent
            .inner
            .tasks
            .lock()
            .unwrap()
            .iter()
            .all(|h| h.is_finished())
        {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }

        // The next submit sweeps all twenty settled handles out.
        agent.submit(|_cancel| Ok(99));
        assert_eq!(agent.inner.tasks.lock().unwrap().len(), 1);
        agent.idle().await;
        assert_eq!(agent.current_value().as_deref(), Some(&99));
    }

    #[tokio::test]
    async fn test_worker_token_trips_on_supersede() {
        let agent: TaskAgent<u32> = TaskAgent::new("animation");
        let (saw_cancel_tx, saw_cancel_rx) = mpsc::channel::<bool>();
        let (hold_tx, hold_rx) = mpsc::channel::<()>();

        agent.submit(move |cancel| {
            hold_rx.recv().ok();
            saw_cancel_tx.send(cancel.is_cancelled()).ok();
            Ok(1)
        });
        agent.submit(|_cancel| Ok(2));
        hold_tx.send(()).unwrap();
        agent.idle().await;

        // The first task could observe its own cancellation and bail early.
        assert!(saw_cancel_rx.recv().unwrap());
    }

    #[tokio::test]
    async fn test_observer_error_raises_failure() {
        let agent: TaskAgent<u32> = TaskAgent::new("grid");
        let log = Log::new();
        agent.observe(Arc::clone(&log));
        agent.observe(|event: &AgentEvent<u32>| {
            if matches!(event, AgentEvent::Update(_)) {
                anyhow::bail!("renderer exploded");
            }
            Ok(())
        });

        agent.submit(|_cancel| Ok(7));
        agent.idle().await;

        assert_eq!(
            log.entries(),
            vec!["submit", "update:7", "fail:renderer exploded"]
        );
    }
}
