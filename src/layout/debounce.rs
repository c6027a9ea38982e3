use std::time::Duration;

use tokio::{
    runtime::Handle,
    task::JoinHandle,
};
use tracing::debug;

/// Runs only the last of a burst of calls, `delay` after it was made.
///
/// Outside a tokio runtime there is nothing to defer on, so calls run immediately.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn call<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let Ok(handle) = Handle::try_current() else {
            debug!("No async runtime, running debounced call now");
            task();
            return;
        };

        let delay = self.delay;
        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map(|pending| !pending.is_finished()).unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
