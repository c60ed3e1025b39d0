use icefield_core::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Counter {
    ticks: Rc<RefCell<Vec<f64>>>,
    finished: Rc<RefCell<u32>>,
}

impl FrameTask for Counter {
    fn tick(&mut self, timestamp_ms: f64) {
        self.ticks.borrow_mut().push(timestamp_ms);
    }

    fn finish(&mut self) {
        *self.finished.borrow_mut() += 1;
    }
}

#[test]
fn first_tick_waits_for_next_frame() {
    let sched = Rc::new(QueuedScheduler::new());
    let task = Counter::default();
    let ticks = task.ticks.clone();
    let handle = spawn_loop("test", sched.clone(), task).unwrap();
    assert!(ticks.borrow().is_empty());
    assert_eq!(sched.pending(), 1);
    sched.run_frame(16.0);
    assert_eq!(*ticks.borrow(), vec![16.0]);
    assert_eq!(handle.frames(), 1);
}

#[test]
fn loop_reschedules_once_per_frame() {
    let sched = Rc::new(QueuedScheduler::new());
    let task = Counter::default();
    let ticks = task.ticks.clone();
    let _handle = spawn_loop("test", sched.clone(), task).unwrap();
    for i in 1..=4 {
        assert_eq!(sched.run_frame(i as f64), 1);
    }
    assert_eq!(*ticks.borrow(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(sched.pending(), 1);
}

#[test]
fn stop_finishes_task_and_stops_rescheduling() {
    let sched = Rc::new(QueuedScheduler::new());
    let task = Counter::default();
    let ticks = task.ticks.clone();
    let finished = task.finished.clone();
    let handle = spawn_loop("test", sched.clone(), task).unwrap();
    sched.run_frame(1.0);
    sched.run_frame(2.0);

    handle.stop();
    assert!(!handle.is_running());
    sched.run_frame(3.0);

    assert_eq!(ticks.borrow().len(), 2);
    assert_eq!(*finished.borrow(), 1);
    assert_eq!(sched.pending(), 0);
    assert_eq!(sched.run_frame(4.0), 0);
}

#[test]
fn stop_is_idempotent() {
    let sched = Rc::new(QueuedScheduler::new());
    let task = Counter::default();
    let finished = task.finished.clone();
    let handle = spawn_loop("test", sched.clone(), task).unwrap();
    handle.stop();
    handle.clone().stop();
    sched.run_frame(1.0);
    assert_eq!(*finished.borrow(), 1);
    assert_eq!(handle.frames(), 0);
}

#[test]
fn independent_loops_share_a_scheduler() {
    let sched = Rc::new(QueuedScheduler::new());
    let a = Counter::default();
    let b = Counter::default();
    let (a_ticks, b_ticks) = (a.ticks.clone(), b.ticks.clone());
    let a_handle = spawn_loop("a", sched.clone(), a).unwrap();
    let _b_handle = spawn_loop("b", sched.clone(), b).unwrap();
    sched.run_frame(1.0);
    a_handle.stop();
    sched.run_frame(2.0);
    sched.run_frame(3.0);
    assert_eq!(a_ticks.borrow().len(), 1);
    assert_eq!(b_ticks.borrow().len(), 3);
}

#[test]
fn rejected_request_fails_spawn() {
    let sched = Rc::new(QueuedScheduler::new());
    sched.set_rejecting(true);
    let err = spawn_loop("test", sched.clone(), Counter::default()).unwrap_err();
    assert!(matches!(err, ScheduleError::Rejected(_)));
}

#[test]
fn rejection_mid_run_stops_the_loop() {
    let sched = Rc::new(QueuedScheduler::new());
    let task = Counter::default();
    let finished = task.finished.clone();
    let handle = spawn_loop("test", sched.clone(), task).unwrap();
    sched.set_rejecting(true);
    sched.run_frame(1.0);
    assert!(!handle.is_running());
    assert_eq!(*finished.borrow(), 1);
    assert_eq!(handle.frames(), 1);
}
