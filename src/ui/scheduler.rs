use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// A unit of work that runs on the UI loop with exclusive access to the UI state.
pub type UiTask<S> = Box<dyn FnOnce(&mut S, &UiHandle<S>) + Send + 'static>;

/// Posts work onto a `UiLoop`. Cheap to clone; every clone feeds the same loop.
///
/// Every posted, delayed or background task is counted as pending until the loop has run it,
/// which is what `UiLoop::run_until_idle` waits on.
pub struct UiHandle<S> {
    tx: mpsc::UnboundedSender<UiTask<S>>,
    pending: Arc<AtomicUsize>,
}

impl<S> Clone for UiHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<S: 'static> UiHandle<S> {
    /// Queues `task` to run on the UI loop.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce(&mut S, &UiHandle<S>) + Send + 'static,
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.send(Box::new(task));
    }

    /// Queues `task` to run on the UI loop once `delay` has passed.
    pub fn post_delayed<F>(&self, delay: Duration, task: F)
    where
        F: FnOnce(&mut S, &UiHandle<S>) + Send + 'static,
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let handle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.send(Box::new(task));
        });
    }

    /// Runs `task` once after each delay in `delays`, one after the other. The second delay starts
    /// counting when the first has elapsed, and so on. The pulse index is passed to `task`.
    /// The sequence cannot be cancelled.
    pub fn post_pulses<F>(&self, delays: Vec<Duration>, task: F)
    where
        F: Fn(&mut S, &UiHandle<S>, usize) + Send + Sync + 'static,
    {
        let count = delays.len();
        self.pending.fetch_add(count, Ordering::SeqCst);
        let handle = self.clone();
        let task = Arc::new(task);
        tokio::spawn(async move {
            for (ix, delay) in delays.into_iter().enumerate() {
                tokio::time::sleep(delay).await;
                let task = task.clone();
                let pulse: UiTask<S> =
                    Box::new(move |state: &mut S, ui: &UiHandle<S>| task(state, ui, ix));
                if !handle.send(pulse) {
                    // The loop is gone, so are the pulses that have not been sent yet.
                    handle
                        .pending
                        .fetch_sub(count - ix - 1, Ordering::SeqCst);
                    return;
                }
            }
        });
    }

    /// Runs `work` on a background worker and then `apply` on the UI loop with its output.
    ///
    /// If `work` panics the panic is logged and `apply` is never called.
    pub fn run_in_background<Fut, T, A>(&self, work: Fut, apply: A)
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        A: FnOnce(&mut S, &UiHandle<S>, T) + Send + 'static,
    {
        self.pending.fetch_add(1, Ordering::SeqCst);
        let handle = self.clone();
        tokio::spawn(async move {
            let task: UiTask<S> = match tokio::spawn(work).await {
                Ok(value) => {
                    Box::new(move |state: &mut S, ui: &UiHandle<S>| apply(state, ui, value))
                }
                Err(e) => {
                    error!("A background task failed: {e}");
                    Box::new(|_: &mut S, _: &UiHandle<S>| {})
                }
            };
            handle.send(task);
        });
    }

    /// The number of tasks that have been scheduled but have not run yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Hands `task` to the loop. Its pending slot must already be counted. Returns `false` and
    /// releases the slot if the loop no longer exists.
    fn send(&self, task: UiTask<S>) -> bool {
        if self.tx.send(task).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            debug!("The UI loop is gone, dropping a task");
            return false;
        }
        true
    }
}

/// The single UI thread. It owns the UI state `S`, and everything that touches the state runs here,
/// one task at a time.
pub struct UiLoop<S> {
    state: S,
    handle: UiHandle<S>,
    rx: mpsc::UnboundedReceiver<UiTask<S>>,
}

impl<S: 'static> UiLoop<S> {
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            handle: UiHandle {
                tx,
                pending: Arc::new(AtomicUsize::new(0)),
            },
            rx,
        }
    }

    pub fn handle(&self) -> UiHandle<S> {
        self.handle.clone()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Runs `event` on the UI thread immediately, the way a user input event is handled.
    pub fn dispatch<R>(&mut self, event: impl FnOnce(&mut S, &UiHandle<S>) -> R) -> R {
        event(&mut self.state, &self.handle)
    }

    /// Runs queued tasks until nothing is pending, including delayed tasks and background work
    /// that has not finished yet.
    pub async fn run_until_idle(&mut self) {
        while self.handle.pending() > 0 {
            if !self.run_one().await {
                break;
            }
        }
    }

    /// Waits for the next task and runs it. Returns `false` if no task can arrive any more.
    pub async fn run_one(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task(&mut self.state, &self.handle);
                self.handle.pending.fetch_sub(1, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_post_runs_in_order() {
        let mut ui = UiLoop::new(Vec::<u32>::new());
        let handle = ui.handle();
        handle.post(|v, _| v.push(1));
        handle.post(|v, _| v.push(2));
        assert_eq!(handle.pending(), 2);
        ui.run_until_idle().await;
        assert_eq!(ui.state(), &vec![1, 2]);
        assert_eq!(handle.pending(), 0);
    }

    #[tokio::test]
    async fn test_background_result_applied_on_loop() {
        let mut ui = UiLoop::new(Vec::<u32>::new());
        ui.dispatch(|_, handle| {
            handle.run_in_background(async { 40 + 2 }, |v, _, value| v.push(value));
        });
        ui.run_until_idle().await;
        assert_eq!(ui.state(), &vec![42]);
    }

    #[tokio::test]
    async fn test_tasks_can_schedule_more_tasks() {
        let mut ui = UiLoop::new(Vec::<u32>::new());
        ui.dispatch(|_, handle| {
            handle.post(|v, ui| {
                v.push(1);
                ui.post_delayed(Duration::from_millis(5), |v, _| v.push(2));
            });
        });
        ui.run_until_idle().await;
        assert_eq!(ui.state(), &vec![1, 2]);
    }

    #[tokio::test]
    async fn test_pulses_run_in_sequence() {
        let mut ui = UiLoop::new(Vec::<usize>::new());
        let start = Instant::now();
        ui.dispatch(|_, handle| {
            let delays = vec![Duration::from_millis(10); 3];
            handle.post_pulses(delays, |v, _, ix| v.push(ix));
        });
        ui.run_until_idle().await;
        assert_eq!(ui.state(), &vec![0, 1, 2]);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_panicking_background_work_releases_its_slot() {
        let mut ui = UiLoop::new(Vec::<u32>::new());
        ui.dispatch(|_, handle| {
            handle.run_in_background(
                async {
                    if true {
                        panic!("boom");
                    }
                    0u32
                },
                |v, _, value| v.push(value),
            );
        });
        ui.run_until_idle().await;
        assert!(ui.state().is_empty());
        assert_eq!(ui.handle().pending(), 0);
    }

    #[tokio::test]
    async fn test_send_after_loop_dropped() {
        let ui = UiLoop::new(Vec::<u32>::new());
        let handle = ui.handle();
        drop(ui);
        handle.post(|v, _| v.push(1));
        assert_eq!(handle.pending(), 0);
    }
}
