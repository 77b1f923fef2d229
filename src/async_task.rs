//! Background execution of settings commands.
//!
//! Collaborator calls (keychain, git network operations, configuration writes) run
//! on worker threads so the event loop keeps drawing. Each finished [`Task`] sends
//! exactly one [`SettingsMsg`] back over a channel; the event loop drains it with
//! [`TaskManager::try_recv`] and feeds it to the model.
//!
//! # Usage
//!
//! ```no_run
//! use rulem::async_task::TaskManager;
//! use rulem::settings::{SettingsMsg, Task};
//!
//! let mut tm = TaskManager::new();
//! tm.spawn(Task::new("noop", || SettingsMsg::AddRemotePatNeeded));
//!
//! if let Some(msg) = tm.try_recv() {
//!     println!("finished: {:?}", msg);
//! }
//! ```

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::thread;

use crate::settings::{SettingsMsg, Task};

pub struct TaskManager {
    sender: Sender<SettingsMsg>,
    receiver: Receiver<SettingsMsg>,
    pending: usize,
}

impl TaskManager {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            pending: 0,
        }
    }

    /// Runs `task` on its own thread. Returns immediately.
    pub fn spawn(&mut self, task: Task) {
        self.pending += 1;
        let sender = self.sender.clone();
        let name = task.name();
        tracing::debug!(task = name, "spawning task");

        thread::spawn(move || {
            let msg = task.run();
            tracing::debug!(task = name, "task finished");
            // receiver gone means the app is shutting down
            let _ = sender.send(msg);
        });
    }

    /// Returns one finished task's message, if any.
    pub fn try_recv(&mut self) -> Option<SettingsMsg> {
        if self.pending == 0 {
            return None;
        }

        match self.receiver.try_recv() {
            Ok(msg) => {
                self.pending -= 1;
                Some(msg)
            }
            Err(_) => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_task_manager_creation() {
        let tm = TaskManager::new();
        assert_eq!(tm.pending_count(), 0);
        assert!(!tm.has_pending());
    }

    #[test]
    fn test_spawn_and_receive() {
        let mut tm = TaskManager::new();
        tm.spawn(Task::new("signal", || SettingsMsg::AddRemotePatNeeded));
        assert!(tm.has_pending());

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut received = None;
        while received.is_none() && Instant::now() < deadline {
            received = tm.try_recv();
            std::thread::sleep(Duration::from_millis(5));
        }

        assert!(matches!(received, Some(SettingsMsg::AddRemotePatNeeded)));
        assert_eq!(tm.pending_count(), 0);
    }
}
