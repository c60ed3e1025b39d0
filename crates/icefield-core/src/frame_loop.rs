//! Per-frame loops with an explicit stop handle.
//!
//! A loop asks its scheduler for one frame at a time and re-requests after
//! each tick. Stopping flips a shared flag: the next callback sees it, runs
//! the task's `finish` hook and drops the task instead of rescheduling.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("frame request rejected: {0}")]
    Rejected(String),
}

/// Callback receiving the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Display-refresh style scheduler: runs each callback once, on a later frame.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<(), ScheduleError>;
}

/// Work performed once per frame.
pub trait FrameTask {
    fn tick(&mut self, timestamp_ms: f64);

    /// Called once when the loop stops.
    fn finish(&mut self) {}
}

/// Caller-owned control of a running loop.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    name: &'static str,
    running: Rc<Cell<bool>>,
    frames: Rc<Cell<u64>>,
}

impl LoopHandle {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            running: Rc::new(Cell::new(true)),
            frames: Rc::new(Cell::new(0)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop after the current frame; no further ticks run.
    pub fn stop(&self) {
        if self.running.replace(false) {
            log::info!("[loop:{}] stop requested", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Ticks run so far.
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }
}

/// Start `task` on `scheduler`. The first tick happens on the next frame.
pub fn spawn_loop<S, T>(
    name: &'static str,
    scheduler: Rc<S>,
    task: T,
) -> Result<LoopHandle, ScheduleError>
where
    S: FrameScheduler + 'static,
    T: FrameTask + 'static,
{
    let handle = LoopHandle::new(name);
    schedule_next(scheduler, Rc::new(RefCell::new(task)), handle.clone())?;
    log::info!("[loop:{}] started", name);
    Ok(handle)
}

fn schedule_next<S, T>(
    scheduler: Rc<S>,
    task: Rc<RefCell<T>>,
    handle: LoopHandle,
) -> Result<(), ScheduleError>
where
    S: FrameScheduler + 'static,
    T: FrameTask + 'static,
{
    let next_scheduler = scheduler.clone();
    scheduler.request_frame(Box::new(move |timestamp_ms| {
        if !handle.is_running() {
            task.borrow_mut().finish();
            return;
        }
        task.borrow_mut().tick(timestamp_ms);
        handle.frames.set(handle.frames.get() + 1);
        if !handle.is_running() {
            task.borrow_mut().finish();
            return;
        }
        let next_handle = handle.clone();
        if let Err(e) = schedule_next(next_scheduler, task.clone(), next_handle) {
            log::error!("[loop:{}] {}", handle.name, e);
            handle.running.set(false);
            task.borrow_mut().finish();
        }
    }))
}

/// Scheduler whose frames are driven by the host calling `run_frame`.
#[derive(Default)]
pub struct QueuedScheduler {
    pending: RefCell<Vec<FrameCallback>>,
    rejecting: Cell<bool>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Refuse (or accept again) new frame requests.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.set(rejecting);
    }

    /// Run every callback queued before this call; returns how many ran.
    pub fn run_frame(&self, timestamp_ms: f64) -> usize {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        let count = batch.len();
        for callback in batch {
            callback(timestamp_ms);
        }
        count
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<(), ScheduleError> {
        if self.rejecting.get() {
            return Err(ScheduleError::Rejected("scheduler is rejecting".into()));
        }
        self.pending.borrow_mut().push(callback);
        Ok(())
    }
}
