//! Executors: marshal action invocations off the hook thread.
//!
//! The hook callback never runs application code inline. It hands a task to
//! an [`Executor`], whose only job is to run it on the thread the
//! application wants (usually the UI thread).

use std::thread::JoinHandle;

/// A unit of work submitted from the hook thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait Executor: Send + Sync {
    /// Queue `task` to run eventually on the executor's target thread.
    fn submit(&self, task: Task);
}

/// Queues tasks for a thread that drains them itself.
///
/// The owning thread calls [`run_pending`](Self::run_pending) from its event
/// loop, or [`run_blocking`](Self::run_blocking) to dedicate itself to it.
pub struct ChannelExecutor {
    sender: async_channel::Sender<Task>,
    receiver: async_channel::Receiver<Task>,
}

impl ChannelExecutor {
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self { sender, receiver }
    }

    /// Run every queued task on the calling thread. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Run tasks as they arrive until [`close`](Self::close) is called.
    pub fn run_blocking(&self) {
        while let Ok(task) = self.receiver.recv_blocking() {
            task();
        }
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Stop accepting tasks. Already queued tasks can still be drained.
    pub fn close(&self) {
        self.sender.close();
    }
}

impl Default for ChannelExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ChannelExecutor {
    fn submit(&self, task: Task) {
        if self.sender.try_send(task).is_err() {
            tracing::warn!(category = "HOTKEY", "Executor channel closed, dropping task");
        }
    }
}

/// Runs tasks in order on a dedicated, named worker thread.
///
/// Dropping the executor closes the queue, lets the worker finish what was
/// already queued, and joins it.
pub struct ThreadExecutor {
    sender: async_channel::Sender<Task>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadExecutor {
    pub fn spawn(name: &str) -> std::io::Result<Self> {
        let (sender, receiver) = async_channel::unbounded::<Task>();
        let worker = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(task) = receiver.recv_blocking() {
                    task();
                }
            })?;

        Ok(Self {
            sender,
            worker: Some(worker),
        })
    }
}

impl Executor for ThreadExecutor {
    fn submit(&self, task: Task) {
        if self.sender.try_send(task).is_err() {
            tracing::warn!(category = "HOTKEY", "Executor thread gone, dropping task");
        }
    }
}

impl Drop for ThreadExecutor {
    fn drop(&mut self) {
        self.sender.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!(category = "HOTKEY", "Executor thread panicked");
            }
        }
    }
}
