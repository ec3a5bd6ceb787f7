use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Cancellation token shared between the scheduler, the Ctrl-C handler and
/// anyone else who wants to end the run loop.
#[derive(Clone)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

struct Slot<T> {
    task: T,
    next_due: Instant,
    period: Option<Duration>,
}

/// Single-threaded cooperative timer loop. Repeating tasks reschedule
/// relative to their own completion time, so the effective period drifts
/// upward by the task's execution latency. There is no jitter compensation.
pub struct Scheduler<T> {
    slots: Vec<Slot<T>>,
    stop: Arc<AtomicBool>,
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Scheduler<T> {
        Scheduler {
            slots: Vec::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Arms a repeating task. The first firing is immediate.
    pub fn schedule_repeating(&mut self, task: T, period: Duration) {
        self.slots.push(Slot {
            task,
            next_due: Instant::now(),
            period: Some(period),
        });
    }

    /// Arms a task that fires once after the given delay.
    pub fn schedule_once(&mut self, task: T, delay: Duration) {
        self.slots.push(Slot {
            task,
            next_due: Instant::now() + delay,
            period: None,
        });
    }

    /// Drives all armed tasks until the stop handle fires, no tasks remain,
    /// or a task returns an error. The stop flag is checked before every
    /// dispatch so no task can fire after cancellation.
    pub fn run(
        &mut self,
        mut dispatch: impl FnMut(T) -> Result<(), String>,
    ) -> Result<(), String> {
        while !self.slots.is_empty() {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            let idx = match self
                .slots
                .iter()
                .enumerate()
                .min_by_key(|(_, slot)| slot.next_due)
            {
                Some((idx, _)) => idx,
                None => break,
            };

            let due = self.slots[idx].next_due;
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }

            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            dispatch(self.slots[idx].task)?;

            match self.slots[idx].period {
                Some(period) => self.slots[idx].next_due = Instant::now() + period,
                None => {
                    self.slots.remove(idx);
                }
            }
        }

        Ok(())
    }
}
