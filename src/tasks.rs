use gloo_timers::callback::{Interval, Timeout};
use std::collections::HashMap;

enum Handle {
    Once(Timeout),
    Repeating(Interval),
}

/// A timer-backed piece of work. Dropping or cancelling it stops any run that
/// has not happened yet.
pub struct ScheduledTask {
    handle: Handle,
}

impl ScheduledTask {
    pub fn after<F: FnOnce() + 'static>(delay_ms: u32, work: F) -> Self {
        ScheduledTask {
            handle: Handle::Once(Timeout::new(delay_ms, work)),
        }
    }

    pub fn every<F: FnMut() + 'static>(period_ms: u32, work: F) -> Self {
        ScheduledTask {
            handle: Handle::Repeating(Interval::new(period_ms, work)),
        }
    }

    pub fn cancel(self) {
        match self.handle {
            Handle::Once(t) => {
                t.cancel();
            }
            Handle::Repeating(i) => {
                i.cancel();
            }
        }
    }
}

/// Outstanding tasks keyed by a per-set serial, so repeated requests for the
/// same subject each keep their own task.
pub struct TaskSet<T = ScheduledTask> {
    next: u32,
    tasks: HashMap<u32, T>,
}

impl<T> Default for TaskSet<T> {
    fn default() -> Self {
        TaskSet {
            next: 0,
            tasks: HashMap::new(),
        }
    }
}

impl<T> TaskSet<T> {
    /// Serial for a task about to be created.
    pub fn reserve(&mut self) -> u32 {
        self.next = self.next.wrapping_add(1);
        self.next
    }

    pub fn insert(&mut self, serial: u32, task: T) {
        self.tasks.insert(serial, task);
    }

    /// Called by a task when it has run.
    pub fn finish(&mut self, serial: u32) -> Option<T> {
        self.tasks.remove(&serial)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.tasks.drain().map(|(_, task)| task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_requests_keep_separate_tasks() {
        let mut set: TaskSet<&str> = TaskSet::default();
        let first = set.reserve();
        set.insert(first, "weather");
        let second = set.reserve();
        set.insert(second, "weather");
        assert_ne!(first, second);

        assert_eq!(set.finish(first), Some("weather"));
        assert_eq!(set.finish(first), None);
        assert_eq!(set.finish(second), Some("weather"));
        assert_eq!(set.drain().count(), 0);
    }

    #[test]
    fn test_drain_empties_the_set() {
        let mut set: TaskSet<u8> = TaskSet::default();
        let mut serials = Vec::new();
        for n in 0..3 {
            let serial = set.reserve();
            set.insert(serial, n);
            serials.push(serial);
        }
        let mut drained: Vec<_> = set.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![0, 1, 2]);
        assert!(serials.into_iter().all(|s| set.finish(s).is_none()));
    }
}
