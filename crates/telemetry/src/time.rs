// Path: crates/telemetry/src/time.rs
use std::time::Instant;

/// An RAII timer that reports its scope's elapsed seconds to a callback on
/// drop, letting each tick loop observe its own duration without threading
/// an `Instant` through every return path (including early returns on
/// error or cancellation).
pub struct Timer<F: FnMut(f64)> {
    start: Instant,
    on_drop: F,
}

impl<F: FnMut(f64)> Timer<F> {
    /// Starts a timer that calls `on_drop` with the elapsed seconds when
    /// the timer goes out of scope.
    pub fn new(on_drop: F) -> Self {
        Self { start: Instant::now(), on_drop }
    }
}

impl<F: FnMut(f64)> Drop for Timer<F> {
    fn drop(&mut self) {
        (self.on_drop)(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn reports_elapsed_seconds_on_drop() {
        let observed = RefCell::new(None);
        {
            let _timer = Timer::new(|secs| *observed.borrow_mut() = Some(secs));
        }
        assert!(observed.borrow().is_some());
    }
}
