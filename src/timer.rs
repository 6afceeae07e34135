//! The once-per-second countdown clock.
//!
//! The session engine decides what a second means; the timers here only
//! deliver the seconds. Each run of a timer gets a fresh [`TimerId`] and every
//! tick it delivers carries that id, so a tick still queued from a stopped run
//! can be told apart from a live one.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

use crate::runtime::QuizEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Repeating countdown task owned by the presentation side.
pub trait CountdownTimer {
    /// Starts a new run, stopping any current one first.
    fn start(&mut self) -> TimerId;
    /// Stops the current run. No tick of that run is delivered afterwards.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

struct RunningTimer {
    id: TimerId,
    cancel: Sender<()>,
    handle: JoinHandle<()>,
}

/// Background-thread timer delivering [`QuizEvent::Tick`] over a channel.
pub struct ThreadTimer {
    interval: Duration,
    events: Sender<QuizEvent>,
    next_id: u64,
    running: Option<RunningTimer>,
}

impl ThreadTimer {
    pub fn new(interval: Duration, events: Sender<QuizEvent>) -> Self {
        Self {
            interval,
            events,
            next_id: 0,
            running: None,
        }
    }

    pub fn current(&self) -> Option<TimerId> {
        self.running.as_ref().map(|r| r.id)
    }
}

impl CountdownTimer for ThreadTimer {
    fn start(&mut self) -> TimerId {
        self.stop();

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let (cancel, cancelled) = mpsc::channel::<()>();
        let events = self.events.clone();
        let interval = self.interval;

        let handle = thread::spawn(move || loop {
            match cancelled.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(QuizEvent::Tick(id)).is_err() {
                        break;
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        debug!(?id, "timer started");
        self.running = Some(RunningTimer { id, cancel, handle });
        id
    }

    fn stop(&mut self) {
        if let Some(run) = self.running.take() {
            let _ = run.cancel.send(());
            // Joining guarantees the thread has sent its last tick.
            let _ = run.handle.join();
            debug!(id = ?run.id, "timer stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Timer for tests and headless drivers: records runs, never ticks on its own.
#[derive(Debug, Default)]
pub struct ManualTimer {
    next_id: u64,
    current: Option<TimerId>,
    pub starts: usize,
    pub stops: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<TimerId> {
        self.current
    }
}

impl CountdownTimer for ManualTimer {
    fn start(&mut self) -> TimerId {
        self.stop();
        self.next_id += 1;
        self.starts += 1;
        let id = TimerId(self.next_id);
        self.current = Some(id);
        id
    }

    fn stop(&mut self) {
        if self.current.take().is_some() {
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.current.is_some()
    }
}
