//! Main (rendering) queue.
//!
//! Producers running on other tasks (timers, async location lookups) must not
//! touch display state directly. They post a closure with
//! [`MainQueue::dispatch`] and the single [`MainLoop`] applies the closures in
//! order, one at a time.

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, trace};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct MainQueue {
    sender: mpsc::UnboundedSender<Job>,
}

pub struct MainLoop {
    receiver: mpsc::UnboundedReceiver<Job>,
}

impl MainQueue {
    pub fn new() -> (Self, MainLoop) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, MainLoop { receiver })
    }

    /// Creates a queue whose loop already runs on the current runtime.
    pub fn spawned() -> (Self, JoinHandle<()>) {
        let (queue, main_loop) = Self::new();
        (queue, main_loop.spawn())
    }

    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Box::new(job)).is_err() {
            debug!("Main loop stopped, dropping dispatched job");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl MainLoop {
    pub async fn run(mut self) {
        while let Some(job) = self.receiver.recv().await {
            trace!("running main queue job");
            job();
        }
        debug!("Main loop finished");
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
