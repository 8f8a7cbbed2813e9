//! Frame coalescing and timers.
//!
//! Everything runs on a single thread. Time is always passed in, so the host decides what "now"
//! is.

use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

/// A request for work on the next frame.
///
/// Any number of requests between two frames collapse into one. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct FrameRequest {
    pending: Rc<Cell<bool>>,
}

impl FrameRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a frame. Returns true only for the first request of a burst, which is when the
    /// host needs to schedule a frame callback.
    pub fn request(&self) -> bool {
        let first = !self.pending.replace(true);
        if first {
            log::trace!("frame requested");
        }
        first
    }

    /// Consume the pending request, if any.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }
}

/// Reports frame callbacks that run longer than a budget. Advisory only.
#[derive(Clone, Debug)]
pub struct FrameBudget {
    name: &'static str,
    budget: Duration,
}

impl FrameBudget {
    pub fn new(name: &'static str, budget: Duration) -> Self {
        Self { name, budget }
    }

    /// Run `f`, then report it if it took too long.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.check(start.elapsed());
        result
    }

    /// Returns true if `elapsed` is within the budget.
    pub fn check(&self, elapsed: Duration) -> bool {
        if elapsed > self.budget {
            log::warn!(
                "{} took {:.2?}, longer than a frame ({:.2?})",
                self.name,
                elapsed,
                self.budget
            );
            return false;
        }
        true
    }
}

/// A trailing edge debounce: fires once, `wait` after the last `schedule`.
#[derive(Clone, Debug)]
pub struct Debounce {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    /// Start, or restart, the waiting window.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    /// Returns true, once, when the window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Returns true if it was armed, disarming it.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn requests_coalesce() {
        let request = FrameRequest::new();
        let other = request.clone();
        assert!(request.request());
        assert!(!request.request());
        assert!(!other.request());
        assert!(other.is_pending());
        assert!(request.take());
        assert!(!request.take());
        assert!(other.request());
    }

    #[test]
    fn budget() {
        let budget = FrameBudget::new("test", Duration::from_millis(16));
        assert!(budget.check(Duration::from_millis(3)));
        assert!(!budget.check(Duration::from_millis(17)));
        assert_eq!(budget.run(|| 5), 5);
    }

    #[test]
    fn debounce_is_trailing() {
        let start = Instant::now();
        let ms = Duration::from_millis;
        let mut debounce = Debounce::new(ms(250));
        assert!(!debounce.poll(start + ms(1000)));

        debounce.schedule(start);
        debounce.schedule(start + ms(100));
        assert!(!debounce.poll(start + ms(300)));
        assert!(debounce.poll(start + ms(350)));
        assert!(!debounce.poll(start + ms(400)));

        debounce.schedule(start);
        assert!(debounce.flush());
        assert!(!debounce.flush());
        assert!(!debounce.is_armed());
    }
}
